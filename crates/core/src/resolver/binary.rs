//! Candidate-list resolution with a system PATH fallback.

use std::path::Path;
use tracing::{debug, info, warn};

use super::error::ResolveError;
use super::types::{ResolutionSource, ResolvedBinary, Tool};
use crate::config::ToolsConfig;

/// Resolves logical tools against the configured executable table.
#[derive(Debug, Clone)]
pub struct BinaryResolver {
    tools: ToolsConfig,
}

impl BinaryResolver {
    pub fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &ToolsConfig {
        &self.tools
    }

    /// Finds an executable for `tool`.
    ///
    /// The first existing candidate wins. It is marked executable if needed;
    /// a candidate that cannot be made executable is skipped. When no candidate
    /// qualifies and the spec allows it, the system PATH is searched.
    ///
    /// May change the permission bits of the matched file. Safe to call
    /// concurrently.
    pub fn resolve(&self, tool: Tool) -> Result<ResolvedBinary, ResolveError> {
        let spec = self.tools.spec(tool);

        for (index, candidate) in spec.candidates.iter().enumerate() {
            if !candidate.exists() {
                continue;
            }

            match ensure_executable(candidate) {
                Ok(()) => {
                    let path = std::path::absolute(candidate)
                        .unwrap_or_else(|_| candidate.to_path_buf());
                    info!("Using {} from: {}", tool, path.display());
                    return Ok(ResolvedBinary::new(
                        tool,
                        path,
                        ResolutionSource::Candidate(index),
                    ));
                }
                Err(e) => {
                    warn!(
                        "Found {} at {} but could not make it executable: {}",
                        tool,
                        candidate.display(),
                        e
                    );
                }
            }
        }

        if spec.search_system_path {
            match which::which(&spec.binary_name) {
                Ok(path) => {
                    info!("Using system {}: {}", tool, path.display());
                    return Ok(ResolvedBinary::new(tool, path, ResolutionSource::SystemPath));
                }
                Err(e) => debug!("{} not on PATH: {}", spec.binary_name, e),
            }
        }

        warn!("{} not found in any location", tool);
        Err(ResolveError::NotFound {
            tool,
            searched: spec.candidates.clone(),
            path_searched: spec.search_system_path,
        })
    }
}

#[cfg(unix)]
fn ensure_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(std::io::Error::other("not a regular file"));
    }

    let mode = metadata.permissions().mode();
    if mode & 0o755 == 0o755 {
        return Ok(());
    }

    match std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode | 0o755)) {
        Ok(()) => Ok(()),
        // Someone else may own the file; it is still usable if any exec bit is set.
        Err(_) if mode & 0o111 != 0 => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn ensure_executable(path: &Path) -> std::io::Result<()> {
    if std::fs::metadata(path)?.is_file() {
        Ok(())
    } else {
        Err(std::io::Error::other("not a regular file"))
    }
}

/// Builds a resolver whose only entry for `tool` is the given candidate list.
#[cfg(test)]
pub(crate) fn resolver_with(
    tool: Tool,
    candidates: Vec<std::path::PathBuf>,
    search_path: bool,
) -> BinaryResolver {
    let mut tools = ToolsConfig::default();
    let mut spec = tools.spec(tool).clone().with_candidates(candidates);
    spec.search_system_path = search_path;
    match tool {
        Tool::Fetcher => tools.fetcher = spec,
        Tool::Transcoder => tools.transcoder = spec,
    }
    BinaryResolver::new(tools)
}
