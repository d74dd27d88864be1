//! The download seam.
//!
//! [`MediaFetcher`] is what an outer surface talks to. [`YtDlpFetcher`] wires
//! the resolver, command builder, process runner and progress sink together
//! for the yt-dlp + ffmpeg pair.
//!
//! # Example
//!
//! ```ignore
//! use tubeloader_core::fetcher::{MediaFetcher, YtDlpFetcher};
//! use tubeloader_core::command::DownloadRequest;
//!
//! let fetcher = YtDlpFetcher::from_config(&config);
//! let formats = fetcher.list_formats("https://youtu.be/abc").await;
//! let request = DownloadRequest::video("https://youtu.be/abc", Some("1280x720"))?;
//! let report = fetcher.download(request).await?;
//! println!("{}", report.message);
//! ```

mod error;
mod traits;
mod types;
mod ytdlp;

pub use error::FetchError;
pub use traits::MediaFetcher;
pub use types::{DownloadReport, ToolStatus};
pub use ytdlp::YtDlpFetcher;
