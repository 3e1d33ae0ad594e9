use std::{
    fmt,
    io::Read as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::Serialize;
use sha2::Digest as _;

use crate::{
    config::PipelineConfig,
    encode_ffmpeg::{Direction, StagedFrames, encode_video},
    error::ReelResult,
    frames::FrameSet,
    render::render_frames,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Render,
    ReverseEncode,
    ForwardEncode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Render => "render",
            Self::ReverseEncode => "reverse encode",
            Self::ForwardEncode => "forward encode",
        })
    }
}

/// One produced video.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputReport {
    pub stage: Stage,
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub frames: usize,
    pub dimensions: (u32, u32),
    pub outputs: Vec<OutputReport>,
}

/// Sequential render, reverse-encode, forward-encode driver.
///
/// Each stage blocks until its subprocess exits; the first failure stops the
/// run and leaves whatever is already on disk in place.
pub struct Pipeline {
    cfg: PipelineConfig,
}

impl Pipeline {
    pub fn new(cfg: PipelineConfig) -> ReelResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// All three stages.
    #[tracing::instrument(skip(self), fields(workdir = %self.cfg.workdir.display()))]
    pub fn run(&self) -> ReelResult<RunReport> {
        self.render()?;
        self.encode()
    }

    pub fn render(&self) -> ReelResult<()> {
        tracing::info!(stage = %Stage::Render, "stage start");
        render_frames(&self.cfg.render, &self.cfg.workdir)
    }

    pub fn frames(&self) -> ReelResult<FrameSet> {
        FrameSet::discover(&self.cfg.workdir, &self.cfg.frames)
    }

    /// Both encode stages over frames already on disk.
    ///
    /// The frame set is listed and validated once, so both videos are built
    /// from the identical ordered input.
    pub fn encode(&self) -> ReelResult<RunReport> {
        let frames = self.frames()?;
        let dimensions = frames.probe_dimensions(self.cfg.encode.needs_even_dimensions())?;
        let staged = StagedFrames::stage(&frames)?;

        let mut outputs = Vec::with_capacity(2);
        for (stage, direction, path) in [
            (
                Stage::ReverseEncode,
                Direction::Reverse,
                self.cfg.mount_path(),
            ),
            (
                Stage::ForwardEncode,
                Direction::Forward,
                self.cfg.dismount_path(),
            ),
        ] {
            tracing::info!(%stage, "stage start");
            encode_video(&self.cfg.encode, &staged, direction, &path)?;
            let report = describe_output(stage, &path)?;
            tracing::info!(
                %stage,
                out = %report.path.display(),
                bytes = report.bytes,
                sha256 = %report.sha256,
                "wrote video"
            );
            outputs.push(report);
        }

        Ok(RunReport {
            frames: frames.len(),
            dimensions,
            outputs,
        })
    }
}

fn describe_output(stage: Stage, path: &Path) -> ReelResult<OutputReport> {
    let mut f = std::fs::File::open(path)
        .with_context(|| format!("failed to open output '{}'", path.display()))?;

    let mut hasher = sha2::Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut bytes = 0u64;
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("failed to read output '{}'", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        bytes += n as u64;
    }

    Ok(OutputReport {
        stage,
        path: path.to_path_buf(),
        bytes,
        sha256: hex(&hasher.finalize()),
    })
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
