//! Maps typed download requests onto fetcher invocations.
//!
//! [`CommandBuilder::build`] is pure: the same request and resolved binaries
//! always produce the same [`CommandSpec`], byte for byte. The environment
//! overlay is recorded on the spec and applied by the runner.

mod builder;
mod types;

pub use builder::CommandBuilder;
pub use types::{CommandSpec, DownloadRequest, EnvOverlay, MediaKind, RequestError, Resolution};
