use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ReelError, ReelResult},
    process::{self, Output},
};

/// Headless Blender invocation that writes the frame sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renderer executable, looked up on `PATH` when bare.
    pub blender: PathBuf,
    /// Python script run by the renderer, relative to the working directory.
    pub script: PathBuf,
    /// Module search path variable extended with the working directory.
    pub search_path_var: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            blender: PathBuf::from("blender"),
            script: PathBuf::from("piece_rendering.py"),
            search_path_var: "PYTHONPATH".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> ReelResult<()> {
        if self.blender.as_os_str().is_empty() {
            return Err(ReelError::validation("renderer executable must be set"));
        }
        if self.script.as_os_str().is_empty() {
            return Err(ReelError::validation("render script must be set"));
        }
        if self.search_path_var.is_empty() || self.search_path_var.contains('=') {
            return Err(ReelError::validation(format!(
                "invalid search path variable name '{}'",
                self.search_path_var
            )));
        }
        Ok(())
    }

    /// Builds the renderer command for `workdir` without running it.
    ///
    /// `current` is the caller's value of the search path variable; the working
    /// directory is appended after its existing entries.
    pub fn command(&self, workdir: &Path, current: Option<OsString>) -> ReelResult<Command> {
        let search_path = extend_search_path(current, workdir)?;

        let mut cmd = Command::new(self.program()?);
        cmd.current_dir(workdir)
            .env(&self.search_path_var, search_path)
            .arg("--background")
            .arg("--python")
            .arg(&self.script);
        Ok(cmd)
    }

    /// Renderer to spawn. A relative path with a directory part is made
    /// absolute against the current directory, since the child runs in the
    /// working directory; a bare name is left for the `PATH` lookup.
    pub fn program(&self) -> ReelResult<PathBuf> {
        if self.blender.is_absolute() || self.blender.components().nth(1).is_none() {
            return Ok(self.blender.clone());
        }
        let program = std::path::absolute(&self.blender).with_context(|| {
            format!("failed to resolve renderer path '{}'", self.blender.display())
        })?;
        Ok(program)
    }
}

/// Appends `dir` to a `PATH`-style list, keeping every existing entry.
pub fn extend_search_path(current: Option<OsString>, dir: &Path) -> ReelResult<OsString> {
    let mut entries: Vec<PathBuf> = current
        .as_deref()
        .map(|v| std::env::split_paths(v).collect())
        .unwrap_or_default();
    entries.push(dir.to_path_buf());

    std::env::join_paths(entries).map_err(|e| {
        ReelError::validation(format!(
            "working directory '{}' cannot be placed on a search path: {e}",
            dir.display()
        ))
    })
}

/// Runs the renderer to completion in `workdir`.
///
/// Frames already on disk are left alone, whatever the outcome.
#[tracing::instrument(skip(cfg), fields(script = %cfg.script.display()))]
pub fn render_frames(cfg: &RenderConfig, workdir: &Path) -> ReelResult<()> {
    cfg.validate()?;

    let script = workdir.join(&cfg.script);
    if !script.is_file() {
        return Err(ReelError::validation(format!(
            "render script '{}' does not exist",
            script.display()
        )));
    }

    let workdir = std::path::absolute(workdir)
        .with_context(|| format!("failed to resolve working directory '{}'", workdir.display()))?;
    let cmd = cfg.command(&workdir, std::env::var_os(&cfg.search_path_var))?;

    tracing::info!(renderer = %cfg.blender.display(), "rendering frames");
    process::run(cmd, Output::Inherit)?;
    tracing::info!("render finished");
    Ok(())
}
