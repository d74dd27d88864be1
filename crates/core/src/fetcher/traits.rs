//! Trait definitions for the fetcher module.

use async_trait::async_trait;

use super::error::FetchError;
use super::types::{DownloadReport, ToolStatus};
use crate::command::DownloadRequest;
use crate::formats::AvailableFormats;

/// Something that can list and download media for a link.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Lists the known resolutions the link offers.
    ///
    /// Never fails; an empty result means "use the default resolution".
    async fn list_formats(&self, url: &str) -> AvailableFormats;

    /// Runs one download to completion.
    ///
    /// A nonzero exit is reported through [`DownloadReport::result`], not as an
    /// error. Progress is written to the fetcher's sink as the run advances.
    async fn download(&self, request: DownloadRequest) -> Result<DownloadReport, FetchError>;

    /// Checks that every tool this fetcher needs is installed and runs.
    async fn validate(&self) -> Result<Vec<ToolStatus>, FetchError>;
}
