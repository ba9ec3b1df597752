use std::collections::VecDeque;

use crate::foundation::core::{FrameRgb, Fps};
use crate::foundation::error::{ReliefError, ReliefResult};

/// Stream metadata known before the first frame is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Pull-based source of decoded frames, read in stream order.
///
/// A pipeline run reads the source from its own dispatcher thread.
pub trait FrameSource: Send {
    fn info(&self) -> SourceInfo;

    /// Next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> ReliefResult<Option<FrameRgb>>;
}

/// Source over frames already held in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    info: SourceInfo,
    frames: VecDeque<FrameRgb>,
}

impl InMemorySource {
    /// Every frame must match the first frame's dimensions.
    pub fn new(fps: Fps, frames: Vec<FrameRgb>) -> ReliefResult<Self> {
        let first = frames
            .first()
            .ok_or_else(|| ReliefError::validation("in-memory source needs at least one frame"))?;
        let (width, height) = (first.width, first.height);
        if let Some(bad) = frames
            .iter()
            .find(|f| f.width != width || f.height != height)
        {
            return Err(ReliefError::validation(format!(
                "in-memory source frames must share one size: {}x{} vs {width}x{height}",
                bad.width, bad.height
            )));
        }
        Ok(Self {
            info: SourceInfo { width, height, fps },
            frames: frames.into(),
        })
    }
}

impl FrameSource for InMemorySource {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn next_frame(&mut self) -> ReliefResult<Option<FrameRgb>> {
        Ok(self.frames.pop_front())
    }
}
