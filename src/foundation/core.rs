use crate::foundation::error::{ReliefError, ReliefResult};

pub use kurbo::Point;

/// 1-based position of a frame in the input stream.
///
/// This is the only key used to restore output order after parallel processing.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameSeq(pub u64);

impl FrameSeq {
    /// The first sequence number handed out by a pipeline run.
    pub const FIRST: FrameSeq = FrameSeq(1);

    /// The sequence number following `self`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for FrameSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReliefResult<Self> {
        if den == 0 {
            return Err(ReliefError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReliefError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse `"30000/1001"` or `"25"` as reported by `ffprobe`.
    pub fn parse_rational(s: &str) -> ReliefResult<Self> {
        let s = s.trim();
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| ReliefError::validation(format!("invalid frame rate '{s}'")))
        };
        match s.split_once('/') {
            Some((num, den)) => Self::new(parse(num)?, parse(den)?),
            None => Self::new(parse(s)?, 1),
        }
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

/// Straight 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `r + g + b`, the per-pixel value region variance is measured on.
    pub fn channel_sum(self) -> u32 {
        u32::from(self.r) + u32::from(self.g) + u32::from(self.b)
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// A decoded or rendered frame as RGB24 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRgb {
    /// Wrap an RGB24 buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> ReliefResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReliefError::validation("frame width/height must be non-zero"));
        }
        let expected = rgb_len(width, height);
        if data.len() != expected {
            return Err(ReliefError::validation(format!(
                "frame buffer size mismatch: got {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with one color.
    pub fn filled(width: u32, height: u32, color: Rgb8) -> ReliefResult<Self> {
        let mut data = Vec::with_capacity(rgb_len(width, height));
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self::new(width, height, data)
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb8 {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 3;
        Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, c: Rgb8) {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 3;
        self.data[i..i + 3].copy_from_slice(&[c.r, c.g, c.b]);
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

pub(crate) fn rgb_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(3)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
