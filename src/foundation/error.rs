use std::{path::PathBuf, process::ExitStatus};

pub type ReelResult<T> = Result<T, ReelError>;

#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("no frames matching '{pattern}' in '{}'", .dir.display())]
    NoFrames { dir: PathBuf, pattern: String },

    #[error("process error: '{program}' exited with {status}{}", fmt_stderr(.stderr))]
    Process {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("spawn error: failed to start '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fmt_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl ReelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn no_frames(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self::NoFrames {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    pub fn spawn(program: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            message: err.to_string(),
        }
    }
}
