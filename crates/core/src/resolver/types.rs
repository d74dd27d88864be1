//! Types for binary resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A named external capability, resolved to a concrete executable at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Fetches media and metadata (yt-dlp).
    Fetcher,
    /// Merges and transcodes streams for the fetcher (ffmpeg).
    Transcoder,
}

impl Tool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetcher => "fetcher",
            Self::Transcoder => "transcoder",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::Fetcher, Tool::Transcoder]
    }

    /// Argument that makes the tool print its version and exit.
    pub fn version_arg(&self) -> &'static str {
        match self {
            Self::Fetcher => "--version",
            Self::Transcoder => "-version",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to look for one logical tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableSpec {
    /// File name searched for on the system PATH.
    pub binary_name: String,
    /// Candidate locations in priority order.
    #[serde(default)]
    pub candidates: Vec<PathBuf>,
    /// Search PATH when none of the candidates exist.
    #[serde(default = "default_search_system_path")]
    pub search_system_path: bool,
}

fn default_search_system_path() -> bool {
    true
}

impl ExecutableSpec {
    /// Creates a spec with no candidates that searches PATH.
    pub fn new(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
            candidates: Vec::new(),
            search_system_path: true,
        }
    }

    /// Replaces the candidate list.
    pub fn with_candidates(mut self, candidates: impl IntoIterator<Item = PathBuf>) -> Self {
        self.candidates = candidates.into_iter().collect();
        self
    }

    /// Disables the PATH fallback.
    pub fn without_system_path(mut self) -> Self {
        self.search_system_path = false;
        self
    }
}

/// How a binary was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum ResolutionSource {
    /// Index into the spec's candidate list.
    Candidate(usize),
    SystemPath,
}

/// An absolute path that passed the executable check.
///
/// Only the resolver constructs these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBinary {
    tool: Tool,
    path: PathBuf,
    executable: bool,
    source: ResolutionSource,
}

impl ResolvedBinary {
    pub(crate) fn new(tool: Tool, path: PathBuf, source: ResolutionSource) -> Self {
        Self {
            tool,
            path,
            executable: true,
            source,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_executable(&self) -> bool {
        self.executable
    }

    pub fn source(&self) -> ResolutionSource {
        self.source
    }

    /// Directory containing the binary, used for `--ffmpeg-location` and PATH.
    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        assert_eq!(Tool::Fetcher.to_string(), "fetcher");
        assert_eq!(Tool::Transcoder.as_str(), "transcoder");
        assert_eq!(Tool::all().len(), 2);
    }

    #[test]
    fn test_spec_builder() {
        let spec = ExecutableSpec::new("ffmpeg")
            .with_candidates([PathBuf::from("/a/ffmpeg")])
            .without_system_path();
        assert_eq!(spec.binary_name, "ffmpeg");
        assert_eq!(spec.candidates, vec![PathBuf::from("/a/ffmpeg")]);
        assert!(!spec.search_system_path);
    }

    #[test]
    fn test_resolved_binary_directory() {
        let bin = ResolvedBinary::new(
            Tool::Transcoder,
            PathBuf::from("/opt/bin/ffmpeg"),
            ResolutionSource::Candidate(0),
        );
        assert_eq!(bin.directory(), Some(Path::new("/opt/bin")));
        assert!(bin.is_executable());
    }
}
