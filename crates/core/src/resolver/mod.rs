//! Binary resolution for the external tools.
//!
//! Each logical tool (the fetcher and its transcoder helper) is described by an
//! [`ExecutableSpec`]: an ordered list of candidate paths plus an optional
//! system `PATH` fallback. [`BinaryResolver::resolve`] walks the candidates,
//! returns the first one that exists and is (or can be made) executable, and
//! otherwise falls back to `PATH`.
//!
//! Nothing is cached: tools may be installed while the process is running, so
//! every call looks again.

mod binary;
mod error;
mod types;

pub use binary::BinaryResolver;
pub use error::ResolveError;
pub use types::{ExecutableSpec, ResolutionSource, ResolvedBinary, Tool};

#[cfg(test)]
pub(crate) use binary::resolver_with;
