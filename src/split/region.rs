use crate::config::SplitOpts;
use crate::foundation::core::{FrameRgb, Rgb8};
use crate::foundation::error::{ReliefError, ReliefResult};

/// Inclusive integer rectangle `[x1, y1]..=[x2, y2]` in source-frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelRect {
    /// Build a rectangle, rejecting inverted bounds.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> ReliefResult<Self> {
        if x2 < x1 || y2 < y1 {
            return Err(ReliefError::geometry(format!(
                "degenerate rectangle [{x1},{y1}]-[{x2},{y2}]"
            )));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// The rectangle covering all of `frame`.
    pub fn full(frame: &FrameRgb) -> ReliefResult<Self> {
        if frame.width == 0 || frame.height == 0 {
            return Err(ReliefError::geometry("frame has no pixels"));
        }
        Self::new(0, 0, frame.width - 1, frame.height - 1)
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1 + 1
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Split into two halves across the longer side.
    ///
    /// Taller-than-wide rectangles split at the midpoint row into top/bottom, everything else at
    /// the midpoint column into left/right. Both halves are always non-empty.
    pub fn split(&self) -> ReliefResult<(PixelRect, PixelRect)> {
        if self.width() < self.height() {
            let mid = midpoint(self.y1, self.y2)?;
            Ok((
                Self::new(self.x1, self.y1, self.x2, mid)?,
                Self::new(self.x1, mid + 1, self.x2, self.y2)?,
            ))
        } else {
            let mid = midpoint(self.x1, self.x2)?;
            Ok((
                Self::new(self.x1, self.y1, mid, self.y2)?,
                Self::new(mid + 1, self.y1, self.x2, self.y2)?,
            ))
        }
    }

    fn contained_in(&self, frame: &FrameRgb) -> bool {
        self.x2 < frame.width && self.y2 < frame.height
    }
}

/// Nearest-integer midpoint of `a..=b` (halves round up), kept below `b` so `[a, mid]` and
/// `[mid + 1, b]` are both non-empty.
pub(crate) fn midpoint(a: u32, b: u32) -> ReliefResult<u32> {
    if b <= a {
        return Err(ReliefError::geometry(format!(
            "cannot split a 1-pixel span at {a}"
        )));
    }
    let rounded = ((u64::from(a) + u64::from(b) + 1) / 2) as u32;
    Ok(rounded.min(b - 1))
}

/// A rectangle of one frame together with its color statistics.
///
/// Statistics are computed once, at construction, and never change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    rect: PixelRect,
    variance: u32,
    mean_color: Rgb8,
    area_fraction: f64,
    min_size: bool,
}

impl Region {
    /// Scan `rect` of `frame` and build the region.
    pub fn evaluate(frame: &FrameRgb, rect: PixelRect, opts: &SplitOpts) -> ReliefResult<Self> {
        if !rect.contained_in(frame) {
            return Err(ReliefError::geometry(format!(
                "rectangle {rect:?} lies outside the {}x{} frame",
                frame.width, frame.height
            )));
        }

        let mut min = u32::MAX;
        let mut max = 0u32;
        let mut sums = [0u64; 3];
        for y in rect.y1..=rect.y2 {
            let row = (y as usize) * (frame.width as usize) * 3;
            let start = row + (rect.x1 as usize) * 3;
            let end = row + (rect.x2 as usize + 1) * 3;
            for px in frame.data[start..end].chunks_exact(3) {
                let c = Rgb8::from([px[0], px[1], px[2]]);
                let v = c.channel_sum();
                min = min.min(v);
                max = max.max(v);
                sums[0] += u64::from(c.r);
                sums[1] += u64::from(c.g);
                sums[2] += u64::from(c.b);
            }
        }

        let count = rect.area();
        if count == 0 {
            return Err(ReliefError::geometry("cannot average an empty region"));
        }
        let mean = |s: u64| ((s as f64) / (count as f64)).round().clamp(0.0, 255.0) as u8;

        let min_size = rect.width() <= opts.min_size && rect.height() <= opts.min_size;
        Ok(Self {
            rect,
            variance: if min_size { 0 } else { max - min },
            mean_color: Rgb8::new(mean(sums[0]), mean(sums[1]), mean(sums[2])),
            area_fraction: (count as f64) / (frame.pixel_count() as f64),
            min_size,
        })
    }

    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Max minus min of `r + g + b` over the rectangle, or 0 at minimum size.
    pub fn variance(&self) -> u32 {
        self.variance
    }

    pub fn mean_color(&self) -> Rgb8 {
        self.mean_color
    }

    /// Rectangle area divided by full-frame area.
    pub fn area_fraction(&self) -> f64 {
        self.area_fraction
    }

    /// Both dimensions are at or below the configured minimum size.
    pub fn is_min_size(&self) -> bool {
        self.min_size
    }

    /// Whether this region is finished under `opts`.
    pub fn is_leaf(&self, opts: &SplitOpts) -> bool {
        self.min_size || self.variance < opts.variance_threshold
    }
}

#[cfg(test)]
#[path = "../../tests/unit/split/region.rs"]
mod tests;
