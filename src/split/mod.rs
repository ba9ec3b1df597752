//! Adaptive partition of one frame into flat-colored rectangles.

pub mod region;
pub mod splitter;
