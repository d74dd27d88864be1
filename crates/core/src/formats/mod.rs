//! Format listing: which target resolutions a link offers.
//!
//! The query runs the fetcher in metadata mode (`-j <url>`) with a bounded
//! wait and keeps the first format seen for each known resolution. Any
//! failure degrades to an empty result so callers can fall back to their
//! default resolution.

mod error;
mod query;
mod types;

pub use error::FormatError;
pub use query::{parse_formats, FormatQuery};
pub use types::{AvailableFormats, FormatDescriptor};
