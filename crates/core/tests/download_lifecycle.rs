//! Download lifecycle integration tests.
//!
//! These drive `YtDlpFetcher` end to end against stub tools written as shell
//! scripts:
//! - progress and log artifacts on success
//! - missing tools leave both artifacts untouched
//! - nonzero exits become failure reports
//! - a tool that cannot be started leaves an explicit error state
//! - the argument list and PATH overlay seen by the fetcher
#![cfg(unix)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use tubeloader_core::{
    fetcher::{FetchError, MediaFetcher, YtDlpFetcher},
    progress::{FileProgressSink, ProgressSink, NO_LOG, WAITING},
    resolver::{ExecutableSpec, Tool},
    runner::{RunError, UNEXPECTED_ERROR_MESSAGE},
    testing::fixtures,
    Config, DownloadRequest,
};

/// Test helper wiring a fetcher to stub tools and a file sink in a temp dir.
struct TestHarness {
    fetcher: YtDlpFetcher,
    sink: Arc<FileProgressSink>,
    temp_dir: TempDir,
}

impl TestHarness {
    /// `fetcher_script` is the body of the yt-dlp stub. `None` leaves a tool uninstalled.
    fn new(fetcher_script: Option<&str>, with_transcoder: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let bin_dir = temp_dir.path().join("bin");
        std::fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");

        let fetcher_path = fetcher_script.map(|script| {
            fixtures::write_stub_tool(&bin_dir, "yt-dlp", script).expect("Failed to write stub")
        });
        let transcoder_path = with_transcoder.then(|| {
            fixtures::write_stub_tool(&bin_dir, "ffmpeg", "echo 'ffmpeg version 6.1'\n")
                .expect("Failed to write stub")
        });

        let mut config = Config::default();
        config.tools.fetcher = ExecutableSpec::new("tubeloader-test-yt-dlp")
            .with_candidates(fetcher_path)
            .without_system_path();
        config.tools.transcoder = ExecutableSpec::new("tubeloader-test-ffmpeg")
            .with_candidates(transcoder_path)
            .without_system_path();
        config.paths.download_dir = temp_dir.path().join("downloads");
        config.paths.state_dir = temp_dir.path().join("state");

        let sink = Arc::new(FileProgressSink::from_paths(&config.paths));
        let fetcher = YtDlpFetcher::new(&config, Arc::clone(&sink) as Arc<dyn ProgressSink>);

        Self {
            fetcher,
            sink,
            temp_dir,
        }
    }

    fn bin_dir(&self) -> PathBuf {
        self.temp_dir.path().join("bin")
    }

    fn recorded(&self, name: &str) -> String {
        std::fs::read_to_string(self.temp_dir.path().join(name))
            .unwrap_or_else(|_| panic!("stub did not write {}", name))
    }
}

/// Stub body that records its arguments and PATH one directory above itself.
const RECORDING_SCRIPT: &str = "root=\"$(dirname \"$0\")/..\"\n\
printf '%s\\n' \"$@\" > \"$root/args.txt\"\n\
echo \"$PATH\" > \"$root/path.txt\"\n\
echo '[download] 100%'\n";

fn video_request() -> DownloadRequest {
    DownloadRequest::video("https://www.youtube.com/watch?v=abc", Some("1280x720"))
        .expect("valid request")
}

#[tokio::test]
async fn test_video_download_success() {
    let script = "echo '[youtube] abc: Downloading webpage'\n\
                  echo '[download] Destination: clip.f136.mp4'\n\
                  echo '[download]  10.0% of 10.00MiB at 1.00MiB/s ETA 00:09'\n\
                  echo '[download]  55.5% of 10.00MiB at 1.00MiB/s ETA 00:04'\n\
                  echo '[download] 100% of 10.00MiB in 00:10'\n\
                  echo '[Merger] Merging formats into \"clip.mp4\"'\n";
    let harness = TestHarness::new(Some(script), true);

    let report = harness.fetcher.download(video_request()).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.result.exit_code, 0);
    assert!(report.message.contains("Video downloaded successfully"));
    assert!(report
        .message
        .contains(&harness.temp_dir.path().join("downloads").display().to_string()));
    assert_eq!(harness.sink.progress(), "SUCCESS: Video download complete");

    // Every child line made it into the log, in order, with a timestamp.
    let log = harness.sink.log_tail(100);
    let webpage = log.find("Downloading webpage").unwrap();
    let ten = log.find("10.0% of").unwrap();
    let merge = log.find("Merging formats").unwrap();
    assert!(webpage < ten && ten < merge);
    assert!(log.lines().all(|line| line.starts_with('[')));
    assert!(log.contains("Starting video download for: https://www.youtube.com/watch?v=abc"));
    assert!(log.contains("Selected resolution: 1280x720"));
    assert!(log.contains("Video download successful"));
}

#[tokio::test]
async fn test_missing_transcoder_touches_nothing() {
    let harness = TestHarness::new(Some("echo should-not-run\n"), false);

    let err = harness.fetcher.download(video_request()).await.unwrap_err();

    match err {
        FetchError::Resolve(e) => assert_eq!(e.tool(), Tool::Transcoder),
        other => panic!("expected a resolve error, got {:?}", other),
    }
    assert_eq!(harness.sink.progress(), WAITING);
    assert_eq!(harness.sink.log_tail(10), NO_LOG);
    assert!(!harness.sink.progress_path().exists());
}

#[tokio::test]
async fn test_nonzero_exit_reports_failure() {
    let script = "echo 'ERROR: [youtube] abc: Video unavailable' >&2\nexit 2\n";
    let harness = TestHarness::new(Some(script), true);

    let report = harness.fetcher.download(video_request()).await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.result.exit_code, 2);
    assert!(report.message.contains("error code: 2"));
    assert_eq!(harness.sink.progress(), "ERROR: Video download failed");

    let log = harness.sink.log_tail(100);
    assert!(log.contains("ERROR: [youtube] abc: Video unavailable"));
    assert!(log.contains("Video download failed with code 2"));
}

#[tokio::test]
async fn test_unstartable_fetcher_leaves_error_state() {
    let harness = TestHarness::new(Some("exit 0\n"), true);
    // Resolves fine, but the kernel cannot run it.
    std::fs::write(harness.bin_dir().join("yt-dlp"), "#!/nonexistent/interp\n")
        .expect("Failed to rewrite stub");

    let err = harness.fetcher.download(video_request()).await.unwrap_err();

    assert!(matches!(err, FetchError::Run(RunError::Spawn { .. })));
    assert!(err.user_message().starts_with("✗ Error:"));
    assert_eq!(harness.sink.progress(), UNEXPECTED_ERROR_MESSAGE);
    assert!(harness.sink.log_tail(100).contains("Unexpected error"));
}

#[tokio::test]
async fn test_video_invocation_arguments() {
    let harness = TestHarness::new(Some(RECORDING_SCRIPT), true);

    harness.fetcher.download(video_request()).await.unwrap();

    let args: Vec<String> = harness
        .recorded("args.txt")
        .lines()
        .map(str::to_string)
        .collect();
    let bin_dir = harness.bin_dir().display().to_string();
    let flag = |name: &str| {
        let i = args
            .iter()
            .position(|a| a == name)
            .unwrap_or_else(|| panic!("missing {}", name));
        args[i + 1].clone()
    };
    assert_eq!(
        flag("-f"),
        "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/\
         bestvideo[height<=720]+bestaudio/best[height<=720]/best"
    );
    assert_eq!(flag("--merge-output-format"), "mp4");
    assert_eq!(flag("--ffmpeg-location"), bin_dir);
    assert_eq!(flag("--http-chunk-size"), "10M");
    assert_eq!(flag("--referer"), "https://www.youtube.com/watch?v=abc");
    assert!(args.contains(&"--newline".to_string()));
    assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");

    let path = harness.recorded("path.txt");
    assert!(path.trim().starts_with(&format!("{}:", bin_dir)));
}

#[tokio::test]
async fn test_audio_invocation_arguments() {
    let harness = TestHarness::new(Some(RECORDING_SCRIPT), true);

    let request = DownloadRequest::audio("https://youtu.be/abc").unwrap();
    harness.fetcher.download(request).await.unwrap();

    let args = harness.recorded("args.txt");
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(&args[..2], ["-f", "bestaudio/best"]);
    assert!(args.contains(&"--extract-audio"));
    assert!(args.windows(2).any(|w| w == ["--audio-format", "mp3"]));
    assert!(args.windows(2).any(|w| w == ["--audio-quality", "0"]));
    assert!(!args.contains(&"--http-chunk-size"));
    assert!(!args.contains(&"--merge-output-format"));
}

#[tokio::test]
async fn test_audio_download_writes_audio_messages() {
    let script = "echo '[download]  42.5% of 3.00MiB'\n\
                  echo '[ExtractAudio] Destination: song.mp3'\n";
    let harness = TestHarness::new(Some(script), true);

    let request = DownloadRequest::audio("https://youtu.be/abc").unwrap();
    let report = harness.fetcher.download(request).await.unwrap();

    assert!(report.is_success());
    assert!(report.message.contains("Audio downloaded successfully"));
    assert_eq!(harness.sink.progress(), "SUCCESS: Audio download complete");
    assert!(harness.sink.log_tail(100).contains("[download]  42.5% of 3.00MiB"));
}

#[tokio::test]
async fn test_poller_never_sees_torn_progress() {
    let script = "i=0\nwhile [ $i -lt 200 ]; do echo \"[download] $i.5%\"; i=$((i+1)); done\n";
    let harness = TestHarness::new(Some(script), true);

    let done = Arc::new(AtomicBool::new(false));
    let poller = {
        let sink = Arc::clone(&harness.sink);
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            let mut seen = Vec::new();
            while !done.load(Ordering::Relaxed) {
                seen.push(sink.progress());
                std::thread::sleep(Duration::from_millis(1));
            }
            seen
        })
    };

    let report = harness.fetcher.download(video_request()).await.unwrap();
    done.store(true, Ordering::Relaxed);
    let seen = poller.join().unwrap();

    assert!(report.is_success());
    for value in seen {
        let known = value == WAITING
            || value == "Starting video download..."
            || value == "SUCCESS: Video download complete"
            || (value.starts_with("VIDEO: ") && value.ends_with(".5%"));
        assert!(known, "unexpected progress value {:?}", value);
    }
}
