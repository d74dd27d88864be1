mod controller;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubeloader_core::{
    load_config_or_default, validate_config, Config, DownloadRequest, FileProgressSink,
    MediaFetcher, MediaKind, ProgressSink, YtDlpFetcher,
};

use controller::DownloadController;

/// How often the progress slot is polled while a download runs.
const POLL_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Parser)]
#[command(name = "tubeloader", version, about = "Download YouTube video and audio with yt-dlp")]
struct Cli {
    /// Configuration file (TOML). Missing files fall back to defaults.
    #[arg(long, global = true, env = "TUBELOADER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the resolutions a link offers
    Formats { url: String },
    /// Download a link as mp4 video, or as audio with --audio
    Download {
        url: String,
        #[arg(long)]
        audio: bool,
        /// Resolution cap, e.g. 1920x1080, 720p or "1440p (2K)"
        #[arg(long, conflicts_with = "audio")]
        resolution: Option<String>,
    },
    /// Print the current progress message
    Progress,
    /// Print the end of the download log
    Log {
        #[arg(long, default_value_t = 50)]
        lines: usize,
    },
    /// Delete the progress and log files
    ClearLogs,
    /// Check that yt-dlp and ffmpeg are installed and runnable
    Check,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        format!("Failed to load config from {:?}", cli.config)
    })?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Download directory: {:?}", config.paths.download_dir);
    info!("State directory: {:?}", config.paths.state_dir);

    let sink = Arc::new(FileProgressSink::from_paths(&config.paths));

    match cli.command {
        Command::Formats { url } => {
            sink.write_session_banner();
            list_formats(&config, sink, &url).await
        }
        Command::Download {
            url,
            audio,
            resolution,
        } => {
            sink.write_session_banner();
            let kind = if audio {
                MediaKind::Audio
            } else {
                MediaKind::Video
            };
            let request = DownloadRequest::new(&url, kind, resolution.as_deref())
                .context("Invalid download request")?;
            download(&config, sink, request).await
        }
        Command::Progress => {
            println!("{}", sink.progress());
            Ok(())
        }
        Command::Log { lines } => {
            println!("{}", sink.log_tail(lines));
            Ok(())
        }
        Command::ClearLogs => {
            sink.clear_logs();
            println!("Logs cleared");
            Ok(())
        }
        Command::Check => check(&config, sink).await,
    }
}

async fn list_formats(config: &Config, sink: Arc<FileProgressSink>, url: &str) -> Result<()> {
    let fetcher = YtDlpFetcher::new(config, sink);
    let formats = fetcher.list_formats(url.trim()).await;

    if formats.is_empty() {
        println!("Could not fetch formats. Using default options.");
        return Ok(());
    }

    println!("Found {} available quality options", formats.len());
    for format in &formats {
        println!(
            "  {:<16} {:>10}  format {} @ {} fps",
            format.resolution.display_name(),
            format.resolution.label(),
            format.format_id,
            format.fps
        );
    }
    Ok(())
}

async fn download(
    config: &Config,
    sink: Arc<FileProgressSink>,
    request: DownloadRequest,
) -> Result<()> {
    let fetcher = Arc::new(YtDlpFetcher::new(config, sink.clone()));
    let controller = DownloadController::new(fetcher, sink.clone());

    let mut handle = controller.start(request)?;
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut last_state = String::new();

    let outcome = loop {
        tokio::select! {
            joined = &mut handle => break joined.context("Download task failed")?,
            _ = ticker.tick() => {
                let state = sink.progress();
                if state != last_state {
                    println!("{}", state);
                    last_state = state;
                }
            }
        }
    };

    let final_state = sink.progress();
    if final_state != last_state {
        println!("{}", final_state);
    }

    match outcome {
        Ok(report) => {
            println!("\n{}", report.message);
            if !report.is_success() {
                bail!(
                    "{} download failed with exit code {}",
                    report.kind.label(),
                    report.result.exit_code
                );
            }
            Ok(())
        }
        Err(e) => {
            println!("\n{}", e.user_message());
            Err(e.into())
        }
    }
}

async fn check(config: &Config, sink: Arc<FileProgressSink>) -> Result<()> {
    let fetcher = YtDlpFetcher::new(config, sink);
    let statuses = fetcher
        .validate()
        .await
        .context("Tool check failed")?;

    for status in statuses {
        println!(
            "✓ {} at {}: {}",
            status.tool,
            status.path.display(),
            status.version
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_download_flags() {
        let cli = Cli::parse_from([
            "tubeloader",
            "download",
            "https://youtu.be/abc",
            "--resolution",
            "720p",
        ]);
        match cli.command {
            Command::Download {
                url,
                audio,
                resolution,
            } => {
                assert_eq!(url, "https://youtu.be/abc");
                assert!(!audio);
                assert_eq!(resolution.as_deref(), Some("720p"));
            }
            _ => panic!("expected download"),
        }
    }

    #[test]
    fn test_audio_and_resolution_conflict() {
        let parsed = Cli::try_parse_from([
            "tubeloader",
            "download",
            "https://youtu.be/abc",
            "--audio",
            "--resolution",
            "720p",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_log_default_lines() {
        let cli = Cli::parse_from(["tubeloader", "log"]);
        assert!(matches!(cli.command, Command::Log { lines: 50 }));
    }
}
