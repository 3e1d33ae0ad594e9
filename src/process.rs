use std::{
    ffi::OsStr,
    process::{Command, Stdio},
};

use crate::error::{ReelError, ReelResult};

/// Where a child's stdout/stderr go while it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    /// Child writes straight to our terminal.
    Inherit,
    /// stderr is collected and attached to the error on failure; stdout is dropped.
    CaptureStderr,
}

pub fn is_on_path(program: impl AsRef<OsStr>) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Renders a command as a single shell-like line for logs.
pub fn command_line(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        let arg = arg.to_string_lossy();
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('\'');
            line.push_str(&arg);
            line.push('\'');
        } else {
            line.push_str(&arg);
        }
    }
    line
}

/// Runs `cmd` to completion and maps a non-zero exit to [`ReelError::Process`].
///
/// Blocks until the child exits. There is no timeout.
pub fn run(mut cmd: Command, output: Output) -> ReelResult<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    tracing::debug!(command = %command_line(&cmd), "spawning");

    cmd.stdin(Stdio::null());
    let (status, stderr) = match output {
        Output::Inherit => {
            let status = cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| ReelError::spawn(&program, &e))?;
            (status, String::new())
        }
        Output::CaptureStderr => {
            let out = cmd
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .map_err(|e| ReelError::spawn(&program, &e))?;
            (out.status, String::from_utf8_lossy(&out.stderr).into_owned())
        }
    };

    if !status.success() {
        return Err(ReelError::Process {
            program,
            status,
            stderr,
        });
    }

    tracing::debug!(program = %program, "process finished");
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn command_line_quotes_whitespace() {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-i", "my frames/%06d.png", ""]);
        assert_eq!(command_line(&cmd), "ffmpeg -i 'my frames/%06d.png' ''");
    }

    #[test]
    fn run_reports_exit_status_and_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo broken >&2; exit 3"]);
        let err = run(cmd, Output::CaptureStderr).unwrap_err();
        match err {
            ReelError::Process {
                program,
                status,
                stderr,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn run_succeeds_on_zero_exit() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exit 0"]);
        run(cmd, Output::Inherit).unwrap();
    }

    #[test]
    fn run_missing_program_is_spawn_error() {
        let cmd = Command::new("definitely-not-a-real-program-cubereel");
        let err = run(cmd, Output::Inherit).unwrap_err();
        assert!(matches!(err, ReelError::Spawn { .. }));
        assert!(!is_on_path("definitely-not-a-real-program-cubereel"));
    }
}
