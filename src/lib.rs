//! cubereel renders the cube puzzle disassembly with headless Blender and
//! assembles the frames into two MP4s with the system `ffmpeg`.
//!
//! # Pipeline overview
//!
//! 1. **Render**: `blender --background --python piece_rendering.py` writes
//!    `puzzle_state<N>.png` into the working directory.
//! 2. **Reverse encode**: the ordered frames become `mount_puzzle.mp4`, played backwards.
//! 3. **Forward encode**: the same frames become `dismount_puzzle.mp4`.
//!
//! The working directory is the hand-off between stages. Frames are listed and
//! ordered explicitly ([`FrameSet`]) rather than through the encoder's glob.
#![forbid(unsafe_code)]

mod foundation;

pub mod config;
pub mod encode_ffmpeg;
pub mod frames;
pub mod pipeline;
pub mod process;
pub mod puzzle;
pub mod render;

pub use foundation::error;

pub use config::PipelineConfig;
pub use encode_ffmpeg::{Direction, EncodeConfig, StagedFrames, encode_video};
pub use error::{ReelError, ReelResult};
pub use frames::{Frame, FramePattern, FrameSet};
pub use pipeline::{OutputReport, Pipeline, RunReport, Stage};
pub use render::{RenderConfig, render_frames};
