use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ReelError, ReelResult},
    frames::FrameSet,
    process::{self, Output},
};

/// Play order of the frame sequence in the output video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

/// Encoder settings shared by both videos.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub ffmpeg: PathBuf,
    pub fps: u32,
    pub codec: String,
    pub pix_fmt: String,
    pub overwrite: bool,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            fps: 4,
            codec: "libx264".to_string(),
            pix_fmt: "yuv420p".to_string(),
            overwrite: true,
        }
    }
}

impl EncodeConfig {
    pub fn validate(&self) -> ReelResult<()> {
        if self.ffmpeg.as_os_str().is_empty() {
            return Err(ReelError::validation("encoder executable must be set"));
        }
        if self.fps == 0 {
            return Err(ReelError::validation("encode fps must be non-zero"));
        }
        if self.codec.is_empty() || self.pix_fmt.is_empty() {
            return Err(ReelError::validation(
                "encode codec and pixel format must be set",
            ));
        }
        Ok(())
    }

    /// Whether the pixel format subsamples chroma in both directions.
    pub fn needs_even_dimensions(&self) -> bool {
        self.pix_fmt.contains("420")
    }

    /// Encoder command reading the numbered image sequence `input_pattern`
    /// (an ffmpeg `%06d` style pattern) and writing an MP4 to `out_path`.
    pub fn command(&self, input_pattern: &Path, direction: Direction, out_path: &Path) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.arg(if self.overwrite { "-y" } else { "-n" });
        cmd.args(["-loglevel", "error", "-framerate"])
            .arg(self.fps.to_string())
            .args(["-start_number", "0", "-i"])
            .arg(input_pattern);

        if direction == Direction::Reverse {
            cmd.args(["-vf", "reverse"]);
        }

        cmd.args(["-an", "-c:v"])
            .arg(&self.codec)
            .arg("-pix_fmt")
            .arg(&self.pix_fmt)
            .args(["-f", "mp4"])
            .arg(out_path);
        cmd
    }
}

pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Frames linked into a private directory as `000000.png`, `000001.png`, ...
///
/// The encoder reads this numbered sequence instead of globbing, so its input
/// order is exactly the [`FrameSet`] order. Removed on drop.
pub struct StagedFrames {
    dir: tempfile::TempDir,
    extension: String,
    count: usize,
}

impl StagedFrames {
    #[tracing::instrument(skip(frames), fields(count = frames.len()))]
    pub fn stage(frames: &FrameSet) -> ReelResult<Self> {
        let extension = frames
            .first()
            .path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        let dir = tempfile::Builder::new()
            .prefix(".cubereel-frames-")
            .tempdir_in(frames.dir())
            .with_context(|| {
                format!(
                    "failed to create staging directory in '{}'",
                    frames.dir().display()
                )
            })?;

        for (seq, frame) in frames.frames().iter().enumerate() {
            let staged = dir.path().join(format!("{seq:06}.{extension}"));
            if std::fs::hard_link(&frame.path, &staged).is_err() {
                std::fs::copy(&frame.path, &staged).with_context(|| {
                    format!(
                        "failed to stage frame '{}' as '{}'",
                        frame.path.display(),
                        staged.display()
                    )
                })?;
            }
        }

        tracing::debug!(dir = %dir.path().display(), "staged frames");
        Ok(Self {
            dir,
            extension,
            count: frames.len(),
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// ffmpeg image2 pattern matching every staged frame.
    ///
    /// A literal `%` in the staging directory is written as `%%`.
    pub fn input_pattern(&self) -> PathBuf {
        let mut pattern: PathBuf = self
            .dir
            .path()
            .components()
            .map(|c| escape_percent(c.as_os_str()))
            .collect();
        pattern.push(format!("%06d.{}", self.extension));
        pattern
    }
}

fn escape_percent(part: &OsStr) -> OsString {
    match part.to_str() {
        Some(s) if s.contains('%') => s.replace('%', "%%").into(),
        _ => part.to_os_string(),
    }
}

/// Temporary sibling of `out_path` the encoder writes to before the rename.
pub fn partial_path(out_path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(out_path.file_name().unwrap_or_default());
    name.push(".part");
    out_path.with_file_name(name)
}

/// Encodes the staged frames into `out_path` in the given play order.
///
/// The video is written next to `out_path` and renamed into place only when
/// the encoder exits zero, so a failed encode leaves any previous output intact.
#[tracing::instrument(skip(cfg, staged), fields(frames = staged.len()))]
pub fn encode_video(
    cfg: &EncodeConfig,
    staged: &StagedFrames,
    direction: Direction,
    out_path: &Path,
) -> ReelResult<()> {
    cfg.validate()?;

    if staged.is_empty() {
        return Err(ReelError::no_frames(staged.dir(), "staged frames"));
    }

    if !cfg.overwrite && out_path.exists() {
        return Err(ReelError::validation(format!(
            "output file '{}' already exists",
            out_path.display()
        )));
    }

    ensure_parent_dir(out_path)?;

    let partial = partial_path(out_path);
    let _ = std::fs::remove_file(&partial);
    let cmd = cfg.command(&staged.input_pattern(), direction, &partial);

    tracing::info!(out = %out_path.display(), ?direction, "encoding video");
    if let Err(e) = process::run(cmd, Output::CaptureStderr) {
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }

    std::fs::rename(&partial, out_path).with_context(|| {
        format!(
            "failed to move '{}' to '{}'",
            partial.display(),
            out_path.display()
        )
    })?;
    Ok(())
}
