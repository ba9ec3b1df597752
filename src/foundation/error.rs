use crate::foundation::core::FrameSeq;

/// Result alias used across the crate.
pub type ReliefResult<T> = Result<T, ReliefError>;

/// Errors produced while splitting, rendering, or streaming frames.
#[derive(thiserror::Error, Debug)]
pub enum ReliefError {
    /// Invalid configuration or mismatched frame/buffer dimensions.
    #[error("validation error: {0}")]
    Validation(String),

    /// A region or face invariant was violated (degenerate rectangle, empty sample set).
    #[error("geometry error: {0}")]
    Geometry(String),

    /// `ffmpeg`/`ffprobe` could not be run, or a stream failed mid-run.
    #[error("media error: {0}")]
    Media(String),

    /// A worker failed to process one frame. Fatal to the whole run.
    #[error("frame {seq} failed: {source}")]
    FrameFailed {
        /// Sequence number of the failed input frame.
        seq: FrameSeq,
        /// Underlying failure.
        source: Box<ReliefError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReliefError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    pub(crate) fn frame_failed(seq: FrameSeq, source: ReliefError) -> Self {
        Self::FrameFailed {
            seq,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
