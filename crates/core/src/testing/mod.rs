//! Test doubles and fixtures.
//!
//! [`MockFetcher`] stands in for a real [`MediaFetcher`](crate::fetcher::MediaFetcher)
//! so outer layers can be tested without yt-dlp installed. The fixtures write
//! small shell scripts that behave like the external tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use tubeloader_core::testing::MockFetcher;
//!
//! let fetcher = MockFetcher::new(sink.clone());
//! fetcher.set_exit_code(1).await;
//! let report = fetcher.download(request).await?;
//! assert!(!report.is_success());
//! ```

mod mock_fetcher;

pub use mock_fetcher::{MockFetcher, RecordedDownload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::command::Resolution;
    use crate::formats::{AvailableFormats, FormatDescriptor};

    /// Trimmed `-j` output: an audio-only entry, a duplicate 1080p entry and
    /// a resolution outside the known set alongside three usable ones.
    pub const SAMPLE_METADATA: &str = r#"{
  "id": "abc",
  "title": "Sample clip",
  "formats": [
    {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2", "width": null, "height": null},
    {"format_id": "18", "ext": "mp4", "vcodec": "avc1.42001E", "width": 640, "height": 360, "fps": 30},
    {"format_id": "136", "ext": "mp4", "vcodec": "avc1.4d401f", "width": 1280, "height": 720, "fps": 30},
    {"format_id": "137", "ext": "mp4", "vcodec": "avc1.640028", "width": 1920, "height": 1080, "fps": 30},
    {"format_id": "248", "ext": "webm", "vcodec": "vp9", "width": 1920, "height": 1080, "fps": 60},
    {"format_id": "313", "ext": "webm", "vcodec": "vp9", "width": 3840, "height": 2160, "fps": 30}
  ]
}"#;

    /// What [`SAMPLE_METADATA`] parses to.
    pub fn sample_formats() -> AvailableFormats {
        let mut formats = AvailableFormats::new();
        for (resolution, id) in [
            (Resolution::Hd, "136"),
            (Resolution::FullHd, "137"),
            (Resolution::Uhd4k, "313"),
        ] {
            formats.insert(FormatDescriptor {
                resolution,
                format_id: id.to_string(),
                fps: 30.0,
            });
        }
        formats
    }

    /// Writes an executable `/bin/sh` script named `name` into `dir`.
    #[cfg(unix)]
    pub fn write_stub_tool(
        dir: &std::path::Path,
        name: &str,
        script: &str,
    ) -> std::io::Result<std::path::PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", script))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }
}
