use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::FormatError;
use super::types::{AvailableFormats, FormatDescriptor};
use crate::command::{CommandBuilder, Resolution};
use crate::resolver::{BinaryResolver, Tool};
use crate::runner::{apply_env, background_command};

#[derive(Deserialize)]
struct Metadata {
    #[serde(default)]
    formats: Vec<MetadataFormat>,
}

#[derive(Deserialize)]
struct MetadataFormat {
    format_id: Option<String>,
    vcodec: Option<String>,
    width: Option<u64>,
    height: Option<u64>,
    fps: Option<f64>,
}

/// Parses the fetcher's `-j` document into the known resolutions it offers.
///
/// Audio-only entries and entries without dimensions are skipped, as are
/// resolutions outside [`Resolution::ALL`]. For each resolution the first
/// matching entry wins.
pub fn parse_formats(json: &str) -> Result<AvailableFormats, FormatError> {
    let metadata: Metadata = serde_json::from_str(json)?;
    let mut available = AvailableFormats::new();

    for format in metadata.formats {
        if format.vcodec.as_deref() == Some("none") {
            continue;
        }
        let (Some(width), Some(height)) = (format.width, format.height) else {
            continue;
        };
        if width == 0 || height == 0 {
            continue;
        }
        let Some(resolution) = Resolution::from_label(&format!("{}x{}", width, height)) else {
            continue;
        };
        let Some(format_id) = format.format_id else {
            continue;
        };

        available.insert(FormatDescriptor {
            resolution,
            format_id,
            fps: format.fps.unwrap_or(0.0),
        });
    }

    Ok(available)
}

/// Lists the formats a link offers by running the fetcher in metadata mode.
pub struct FormatQuery {
    resolver: BinaryResolver,
    builder: CommandBuilder,
    timeout: Duration,
}

impl FormatQuery {
    pub fn new(resolver: BinaryResolver, builder: CommandBuilder, timeout: Duration) -> Self {
        Self {
            resolver,
            builder,
            timeout,
        }
    }

    /// Never fails: every error is logged and yields an empty result.
    pub async fn list_formats(&self, url: &str) -> AvailableFormats {
        info!("Fetching formats for: {}", url);

        match self.query(url).await {
            Ok(formats) => {
                info!("Found {} formats", formats.len());
                formats
            }
            Err(FormatError::NonZeroExit { code, stderr }) => {
                warn!("Error fetching formats: exit code {}", code);
                debug!("stderr: {}", stderr.trim());
                AvailableFormats::new()
            }
            Err(e) => {
                warn!("Error fetching formats: {}", e);
                AvailableFormats::new()
            }
        }
    }

    async fn query(&self, url: &str) -> Result<AvailableFormats, FormatError> {
        let fetcher = self.resolver.resolve(Tool::Fetcher)?;
        let spec = self.builder.build_metadata_query(url, &fetcher);
        debug!("Format query: {}", spec.display());

        let mut command = background_command(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        apply_env(&mut command, &spec.env);

        let mut command = tokio::process::Command::from(command);
        command.kill_on_drop(true);

        // Dropping the output future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| FormatError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(FormatError::Spawn)?;

        if !output.status.success() {
            return Err(FormatError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        parse_formats(&String::from_utf8_lossy(&output.stdout))
    }
}
