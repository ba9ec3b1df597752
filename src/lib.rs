//! Blockrelief turns video into a field of shaded, extruded blocks.
//!
//! Each frame is split into flat-colored rectangles by recursive variance splitting, every
//! rectangle is raised into a box whose height follows its area, and the boxes are projected
//! through a tilted pinhole camera and painted back-to-front. Frames are processed on a worker
//! pool and written out in input order:
//!
//! - Pull frames from a [`FrameSource`]
//! - Render them with a [`ReliefRenderer`] via [`run_pipeline`]
//! - Receive them in sequence order in a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Run configuration (split, render, and threading options).
pub mod config;
/// Decoded-frame sources.
pub mod decode;
/// Encoding sinks.
pub mod encode;
/// Parallel, order-preserving frame pipeline.
pub mod pipeline;
/// Block extrusion, projection, and painting.
pub mod render;
/// Region splitting.
pub mod split;

pub use crate::foundation::core::{Fps, FrameRgb, FrameSeq, Point, Rgb8};
pub use crate::foundation::error::{ReliefError, ReliefResult};

pub use crate::config::{ReliefConfig, RenderOpts, SplitOpts, ThreadingOpts};
pub use crate::decode::ffmpeg::{FfmpegSource, probe_video};
pub use crate::decode::source::{FrameSource, InMemorySource, SourceInfo};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::pipeline::cancel::CancelToken;
pub use crate::pipeline::scheduler::{FrameProcessor, PipelineState, RunStats, run_pipeline};
pub use crate::render::ReliefRenderer;
pub use crate::split::region::{PixelRect, Region};
pub use crate::split::splitter::split_frame;
