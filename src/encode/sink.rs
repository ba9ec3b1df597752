use crate::foundation::core::{FrameRgb, FrameSeq, Fps};
use crate::foundation::error::ReliefResult;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second (same as the source).
    pub fps: Fps,
}

/// Sink contract for consuming rendered frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing [`FrameSeq`] order, and
/// `end` must be called to flush the output.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReliefResult<()>;
    /// Push one frame in strictly increasing sequence order.
    fn push_frame(&mut self, seq: FrameSeq, frame: &FrameRgb) -> ReliefResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReliefResult<()>;
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameSeq, FrameRgb)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames in the order they were pushed.
    pub fn frames(&self) -> &[(FrameSeq, FrameRgb)] {
        &self.frames
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReliefResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, seq: FrameSeq, frame: &FrameRgb) -> ReliefResult<()> {
        self.frames.push((seq, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReliefResult<()> {
        self.finished = true;
        Ok(())
    }
}
