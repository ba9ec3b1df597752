//! Encoding sinks.
//!
//! Sinks consume rendered frames in sequence order and are fed by `run_pipeline`.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
