use std::collections::VecDeque;

use crate::config::SplitOpts;
use crate::foundation::core::FrameRgb;
use crate::foundation::error::ReliefResult;
use crate::split::region::{PixelRect, Region};

/// Partition `frame` into leaf regions.
///
/// Candidates are taken from a FIFO work list seeded with the whole frame. A candidate that is
/// already a leaf is kept; otherwise it is split in two and both halves re-enter the list. The
/// returned leaves tile the frame exactly.
#[tracing::instrument(level = "trace", skip_all, fields(width = frame.width, height = frame.height))]
pub fn split_frame(frame: &FrameRgb, opts: &SplitOpts) -> ReliefResult<Vec<Region>> {
    let root = Region::evaluate(frame, PixelRect::full(frame)?, opts)?;

    let mut pending = VecDeque::from([root]);
    let mut leaves = Vec::new();
    while let Some(region) = pending.pop_front() {
        if region.is_leaf(opts) {
            leaves.push(region);
            continue;
        }
        let (a, b) = region.rect().split()?;
        pending.push_back(Region::evaluate(frame, a, opts)?);
        pending.push_back(Region::evaluate(frame, b, opts)?);
    }

    tracing::trace!(leaves = leaves.len(), "frame split");
    Ok(leaves)
}

#[cfg(test)]
#[path = "../../tests/unit/split/splitter.rs"]
mod tests;
