use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    encode_ffmpeg::EncodeConfig,
    error::{ReelError, ReelResult},
    frames::FramePattern,
    render::RenderConfig,
};

/// Everything a pipeline run needs. Defaults reproduce the fixed recipe:
/// `blender --background --python piece_rendering.py`, then two 4 fps
/// libx264/yuv420p encodes of `puzzle_state*.png`.
///
/// Relative paths (outputs, script) resolve against `workdir`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub workdir: PathBuf,
    pub render: RenderConfig,
    pub frames: FramePattern,
    pub encode: EncodeConfig,
    /// Video playing the frames backwards.
    pub mount_output: PathBuf,
    /// Video playing the frames in render order.
    pub dismount_output: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            render: RenderConfig::default(),
            frames: FramePattern::default(),
            encode: EncodeConfig::default(),
            mount_output: PathBuf::from("mount_puzzle.mp4"),
            dismount_output: PathBuf::from("dismount_puzzle.mp4"),
        }
    }
}

impl PipelineConfig {
    /// Reads a JSON config; missing fields take their defaults.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let f = File::open(path).map_err(|e| {
            ReelError::config(format!("failed to open '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
            .map_err(|e| ReelError::config(format!("'{}': {e}", path.display())))
    }

    pub fn from_reader(r: impl std::io::Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(r)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.workdir.as_os_str().is_empty() {
            return Err(ReelError::validation("working directory must be set"));
        }
        self.render.validate()?;
        self.frames.validate()?;
        self.encode.validate()?;

        let mount = self.mount_path();
        let dismount = self.dismount_path();
        if mount == dismount {
            return Err(ReelError::validation(format!(
                "mount and dismount outputs must differ (both '{}')",
                mount.display()
            )));
        }
        for out in [&mount, &dismount] {
            let is_frame = out
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| self.frames.index_of(n))
                .is_some();
            if is_frame {
                return Err(ReelError::validation(format!(
                    "output '{}' would be picked up as a frame",
                    out.display()
                )));
            }
        }
        Ok(())
    }

    pub fn mount_path(&self) -> PathBuf {
        self.workdir.join(&self.mount_output)
    }

    pub fn dismount_path(&self) -> PathBuf {
        self.workdir.join(&self.dismount_output)
    }
}
