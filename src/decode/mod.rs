//! Decoded-frame sources.

/// `ffmpeg`-based source (any container/codec the system `ffmpeg` can read).
pub mod ffmpeg;
/// Generic frame source trait and built-in sources.
pub mod source;
