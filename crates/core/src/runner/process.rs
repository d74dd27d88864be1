//! Blocking child-process supervision.

use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::classify::{classify_line, UNEXPECTED_ERROR_MESSAGE};
use super::error::RunError;
use super::types::ProcessResult;
use crate::command::{CommandSpec, EnvOverlay};
use crate::progress::ProgressSink;

/// Creates a command that will not pop up a console window on Windows.
pub(crate) fn background_command(program: impl AsRef<OsStr>) -> Command {
    let mut command = Command::new(program);
    configure_for_background(&mut command);
    command
}

#[cfg(windows)]
fn configure_for_background(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn configure_for_background(_command: &mut Command) {}

/// Applies an [`EnvOverlay`] on top of the inherited environment.
pub(crate) fn apply_env(command: &mut Command, overlay: &EnvOverlay) {
    if !overlay.path_prepend.is_empty() {
        let inherited = std::env::var_os("PATH");
        let dirs = overlay.path_prepend.iter().cloned().chain(
            inherited
                .iter()
                .flat_map(|path| std::env::split_paths(path).collect::<Vec<_>>()),
        );
        match std::env::join_paths(dirs) {
            Ok(path) => {
                debug!("Child PATH: {}", path.to_string_lossy());
                command.env("PATH", path);
            }
            Err(e) => warn!("Could not extend PATH for child: {}", e),
        }
    }
    command.envs(&overlay.vars);
}

/// Runs one command to completion, feeding a [`ProgressSink`].
pub struct ProcessRunner {
    sink: Arc<dyn ProgressSink>,
}

impl ProcessRunner {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink }
    }

    /// Spawns `spec`, streams its merged output, and waits for it to exit.
    ///
    /// Blocks the calling thread for the whole run. A spawn failure returns
    /// before the sink is touched. A read failure sets the sink to an explicit
    /// error message before returning.
    pub fn run(&self, spec: &CommandSpec, progress_prefix: &str) -> Result<ProcessResult, RunError> {
        let spawn_error = |source| RunError::Spawn {
            program: spec.program.clone(),
            source,
        };

        let (reader, writer) = io::pipe().map_err(spawn_error)?;
        let writer_err = writer.try_clone().map_err(spawn_error)?;

        // The command owns the parent's copies of the write end; dropping it
        // at the end of this block lets the reader see EOF when the child exits.
        let mut child = {
            let mut command = background_command(&spec.program);
            command
                .args(&spec.args)
                .stdin(Stdio::null())
                .stdout(writer)
                .stderr(writer_err);
            apply_env(&mut command, &spec.env);
            command.spawn().map_err(spawn_error)?
        };

        info!("Running command: {}", spec.display());
        self.sink
            .append_log(&format!("Running command: {}", spec.display()));

        let status = match self.pump(reader, progress_prefix) {
            Ok(()) => child.wait(),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(e)
            }
        };

        match status {
            Ok(status) => {
                let exit_code = status.code().unwrap_or(-1);
                debug!("Process exited with code {}", exit_code);
                Ok(ProcessResult::from_exit_code(exit_code))
            }
            Err(source) => {
                error!("Error running command: {:?}", source);
                self.sink
                    .append_log(&format!("Error running command: {:?}", source));
                self.sink.set_progress(UNEXPECTED_ERROR_MESSAGE);
                Err(RunError::Stream { source })
            }
        }
    }

    /// Reads lines until EOF. Every line is logged; recognised ones update progress.
    fn pump(&self, reader: impl Read, prefix: &str) -> io::Result<()> {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            debug!(target: "tubeloader::child", "{}", line);

            if let Some(state) = classify_line(line, prefix) {
                self.sink.set_progress(&state.message);
            }
            self.sink.append_log(line);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::progress::{MemoryProgressSink, WAITING};
    use std::path::PathBuf;

    fn shell(script: &str) -> CommandSpec {
        CommandSpec {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), script.to_string()],
            env: EnvOverlay::default(),
        }
    }

    fn runner() -> (Arc<MemoryProgressSink>, ProcessRunner) {
        let sink = Arc::new(MemoryProgressSink::new());
        let runner = ProcessRunner::new(sink.clone());
        (sink, runner)
    }

    #[test]
    fn test_successful_run_reports_last_percentage() {
        let (sink, runner) = runner();
        let spec = shell("echo '[download] 10.0%'; echo '[download] 100%'; exit 0");

        let result = runner.run(&spec, "VIDEO").unwrap();

        assert_eq!(result, ProcessResult::from_exit_code(0));
        assert!(result.is_success());
        assert_eq!(sink.progress(), "VIDEO: 100%");
    }

    #[test]
    fn test_nonzero_exit_is_failure_value() {
        let (_, runner) = runner();
        let result = runner.run(&shell("echo nope; exit 3"), "AUDIO").unwrap();
        assert!(!result.is_success());
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn test_every_line_logged_in_emission_order() {
        let (sink, runner) = runner();
        let spec = shell("echo one; echo two 1>&2; echo three");

        runner.run(&spec, "VIDEO").unwrap();

        let entries = sink.log_entries();
        assert!(entries[0].starts_with("Running command: /bin/sh"));
        assert_eq!(&entries[1..], ["one", "two", "three"]);
        // None of those lines were progress.
        assert_eq!(sink.progress(), WAITING);
    }

    #[test]
    fn test_unmatched_line_keeps_previous_state() {
        let (sink, runner) = runner();
        let spec = shell("echo '[download]   5.0% of 3MiB'; echo '[youtube] abc: Downloading webpage'");

        runner.run(&spec, "VIDEO").unwrap();

        assert_eq!(sink.progress(), "VIDEO: 5.0%");
        assert_eq!(
            sink.log_entries().last().map(String::as_str),
            Some("[youtube] abc: Downloading webpage")
        );
    }

    #[test]
    fn test_classified_stages() {
        let (sink, runner) = runner();
        runner
            .run(&shell("echo '[Merger] Merging formats into \"a.mp4\"'"), "VIDEO")
            .unwrap();
        assert_eq!(sink.progress(), "Merging video and audio...");
    }

    #[test]
    fn test_spawn_failure_touches_nothing() {
        let (sink, runner) = runner();
        let spec = CommandSpec {
            program: PathBuf::from("/nonexistent/yt-dlp"),
            args: vec![],
            env: EnvOverlay::default(),
        };

        let err = runner.run(&spec, "VIDEO").unwrap_err();

        assert!(matches!(err, RunError::Spawn { .. }));
        assert_eq!(sink.progress(), WAITING);
        assert!(sink.log_entries().is_empty());
    }

    #[test]
    fn test_path_overlay_is_prepended() {
        let (sink, runner) = runner();
        let mut spec = shell("echo \"PATH=$PATH\"");
        spec.env.path_prepend = vec![PathBuf::from("/opt/ffmpeg/bin")];

        runner.run(&spec, "VIDEO").unwrap();

        let entries = sink.log_entries();
        assert!(entries[1].starts_with("PATH=/opt/ffmpeg/bin:"));
    }

    #[test]
    fn test_extra_env_vars() {
        let (sink, runner) = runner();
        let mut spec = shell("echo \"X=$TUBELOADER_TEST_VAR\"");
        spec.env
            .vars
            .insert("TUBELOADER_TEST_VAR".to_string(), "42".to_string());

        runner.run(&spec, "VIDEO").unwrap();
        assert_eq!(sink.log_entries()[1], "X=42");
    }
}
