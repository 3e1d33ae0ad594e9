use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};

/// Name shape of the rendered frames: `<prefix><N>.<extension>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramePattern {
    pub prefix: String,
    pub extension: String,
}

impl Default for FramePattern {
    fn default() -> Self {
        Self {
            prefix: "puzzle_state".to_string(),
            extension: "png".to_string(),
        }
    }
}

impl FramePattern {
    pub fn validate(&self) -> ReelResult<()> {
        if self.prefix.is_empty() {
            return Err(ReelError::validation("frame prefix must be non-empty"));
        }
        if self.extension.is_empty() || self.extension.contains('.') {
            return Err(ReelError::validation(
                "frame extension must be non-empty and given without a dot",
            ));
        }
        Ok(())
    }

    /// Shell-style rendering of the pattern, for messages.
    pub fn glob(&self) -> String {
        format!("{}*.{}", self.prefix, self.extension)
    }

    /// Parses the frame index out of a file name, `None` if the name does not match.
    pub fn index_of(&self, file_name: &str) -> Option<u64> {
        let digits = file_name
            .strip_prefix(&self.prefix)?
            .strip_suffix(&self.extension)?
            .strip_suffix('.')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    fn loosely_matches(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.prefix)
            && file_name
                .strip_suffix(&self.extension)
                .is_some_and(|s| s.ends_with('.'))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub index: u64,
    pub path: PathBuf,
}

/// Ordered, non-empty list of frames found in one directory.
#[derive(Clone, Debug)]
pub struct FrameSet {
    dir: PathBuf,
    frames: Vec<Frame>,
}

impl FrameSet {
    /// Lists `dir` for frames matching `pattern`, ordered by frame index.
    ///
    /// Ties on the index (`x01.png` next to `x1.png`) fall back to the file name.
    /// Fails with [`ReelError::NoFrames`] when nothing matches.
    #[tracing::instrument(skip(pattern), fields(pattern = %pattern.glob()))]
    pub fn discover(dir: &Path, pattern: &FramePattern) -> ReelResult<Self> {
        pattern.validate()?;

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to list frame directory '{}'", dir.display()))?;

        let mut frames = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to read entry in '{}'", dir.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !pattern.loosely_matches(name) {
                continue;
            }
            let Some(index) = pattern.index_of(name) else {
                tracing::warn!(file = name, "skipping file without a numeric frame index");
                continue;
            };
            let is_file = entry
                .file_type()
                .with_context(|| format!("failed to stat '{}'", entry.path().display()))?
                .is_file();
            if !is_file {
                continue;
            }
            frames.push(Frame {
                index,
                path: entry.path(),
            });
        }

        if frames.is_empty() {
            return Err(ReelError::no_frames(dir, pattern.glob()));
        }

        frames.sort_by(|a, b| {
            a.index
                .cmp(&b.index)
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
        });

        for pair in frames.windows(2) {
            if pair[1].index > pair[0].index.saturating_add(1) {
                tracing::debug!(
                    after = pair[0].index,
                    before = pair[1].index,
                    "gap in frame numbering"
                );
            }
        }

        tracing::info!(count = frames.len(), dir = %dir.display(), "found frames");
        Ok(Self {
            dir: dir.to_path_buf(),
            frames,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; an empty listing is rejected by [`FrameSet::discover`].
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn first(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn last(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    /// Checks that every frame decodes to the same width and height, even in
    /// both when `require_even` is set (4:2:0 output). Returns `(width, height)`.
    pub fn probe_dimensions(&self, require_even: bool) -> ReelResult<(u32, u32)> {
        let first = self.first();
        let (width, height) = image::image_dimensions(&first.path)
            .with_context(|| format!("failed to read frame '{}'", first.path.display()))?;

        if width == 0 || height == 0 {
            return Err(ReelError::validation(format!(
                "frame '{}' has zero size",
                first.path.display()
            )));
        }
        if require_even && (!width.is_multiple_of(2) || !height.is_multiple_of(2)) {
            return Err(ReelError::validation(format!(
                "frame size {width}x{height} must be even (required for yuv420p mp4 output)"
            )));
        }

        for frame in &self.frames[1..] {
            let dims = image::image_dimensions(&frame.path)
                .with_context(|| format!("failed to read frame '{}'", frame.path.display()))?;
            if dims != (width, height) {
                return Err(ReelError::validation(format!(
                    "frame '{}' is {}x{}, expected {width}x{height}",
                    frame.path.display(),
                    dims.0,
                    dims.1
                )));
            }
        }

        Ok((width, height))
    }
}
