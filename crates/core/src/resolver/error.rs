//! Error types for the resolver module.

use std::path::PathBuf;
use thiserror::Error;

use super::types::Tool;

/// Errors that can occur while resolving a tool to an executable.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No candidate existed and the system PATH had no match.
    #[error("{tool} not found (searched {} location(s){})", .searched.len(), path_note(.path_searched))]
    NotFound {
        tool: Tool,
        searched: Vec<PathBuf>,
        path_searched: bool,
    },
}

fn path_note(path_searched: &bool) -> &'static str {
    if *path_searched {
        " and PATH"
    } else {
        ""
    }
}

impl ResolveError {
    /// The tool that could not be resolved.
    pub fn tool(&self) -> Tool {
        match self {
            Self::NotFound { tool, .. } => *tool,
        }
    }
}
