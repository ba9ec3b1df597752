//! Run configuration: splitter, renderer and threading knobs.
//!
//! Every section deserializes with defaults, so a JSON file only needs the keys it changes.

use std::path::Path;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{ReliefError, ReliefResult};

/// Stopping rule for the region splitter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitOpts {
    /// A region is a leaf when its variance is strictly below this value.
    pub variance_threshold: u32,
    /// Regions with width and height both at or below this size report variance 0.
    pub min_size: u32,
}

impl Default for SplitOpts {
    fn default() -> Self {
        Self {
            variance_threshold: 100,
            min_size: 5,
        }
    }
}

/// Block extrusion and camera constants.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOpts {
    /// Output pixels per input pixel.
    pub scale: u32,
    /// Padding around the scaled frame, in output pixels.
    pub border: u32,
    /// Upper bound on a block's extrusion height.
    pub max_height: f64,
    /// Extrusion height per unit of area fraction.
    pub height_factor: f64,
    /// Camera tilt about the horizontal axis.
    pub tilt_radians: f64,
    /// Pinhole distance used by the perspective divide.
    pub view_distance: f64,
    /// Canvas fill painted before any face.
    pub background: Rgb8,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            scale: 2,
            border: 40,
            max_height: 150.0,
            height_factor: 2000.0,
            tilt_radians: 0.2,
            view_distance: 500.0,
            background: Rgb8::new(18, 20, 28),
        }
    }
}

impl RenderOpts {
    /// Output canvas size for an input frame of `width x height`.
    pub fn canvas_size(&self, width: u32, height: u32) -> ReliefResult<(u32, u32)> {
        let side = |v: u32| {
            v.checked_mul(self.scale)
                .and_then(|s| s.checked_add(self.border.saturating_mul(2)))
                .filter(|&s| s <= u32::from(u16::MAX))
                .ok_or_else(|| {
                    ReliefError::validation(format!(
                        "output canvas for {width}x{height} at scale {} + border {} exceeds {} px",
                        self.scale,
                        self.border,
                        u16::MAX
                    ))
                })
        };
        Ok((side(width)?, side(height)?))
    }
}

/// Worker pool sizing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThreadingOpts {
    /// Explicit worker count. Defaults to available parallelism minus one (minimum 1).
    pub workers: Option<usize>,
    /// Bounded work queue capacity. Defaults to twice the worker count.
    pub queue_capacity: Option<usize>,
}

impl ThreadingOpts {
    /// Effective worker count.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .saturating_sub(1)
                .max(1)
        })
    }

    /// Effective work queue capacity for `workers` workers.
    pub fn queue_capacity_for(&self, workers: usize) -> usize {
        self.queue_capacity
            .unwrap_or_else(|| workers.saturating_mul(2))
            .max(1)
    }

    /// Most frames a run holds at once: queued, being rendered, or waiting to be written in
    /// order. The dispatcher stops pulling from the source while this many are outstanding.
    pub fn in_flight_limit(&self, workers: usize) -> usize {
        self.queue_capacity_for(workers)
            .saturating_add(workers.saturating_mul(2))
    }
}

/// Full configuration for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReliefConfig {
    pub split: SplitOpts,
    pub render: RenderOpts,
    pub threading: ThreadingOpts,
}

impl ReliefConfig {
    /// Parse a JSON config document.
    pub fn from_json_str(s: &str) -> ReliefResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| ReliefError::validation(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_path(path: &Path) -> ReliefResult<Self> {
        use anyhow::Context as _;

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ReliefResult<()> {
        // Both must be >= 1 for the splitter to terminate.
        if self.split.variance_threshold == 0 {
            return Err(ReliefError::validation(
                "split.variance_threshold must be >= 1",
            ));
        }
        if self.split.min_size == 0 {
            return Err(ReliefError::validation("split.min_size must be >= 1"));
        }

        let r = &self.render;
        if r.scale == 0 {
            return Err(ReliefError::validation("render.scale must be >= 1"));
        }
        if !r.max_height.is_finite() || r.max_height < 0.0 {
            return Err(ReliefError::validation(
                "render.max_height must be finite and >= 0",
            ));
        }
        if !r.height_factor.is_finite() || r.height_factor < 0.0 {
            return Err(ReliefError::validation(
                "render.height_factor must be finite and >= 0",
            ));
        }
        if !r.view_distance.is_finite() || r.view_distance <= 0.0 {
            return Err(ReliefError::validation(
                "render.view_distance must be finite and > 0",
            ));
        }
        if !r.tilt_radians.is_finite() || r.tilt_radians.abs() >= std::f64::consts::FRAC_PI_2 {
            return Err(ReliefError::validation(
                "render.tilt_radians must be finite and within (-pi/2, pi/2)",
            ));
        }

        if self.threading.workers == Some(0) {
            return Err(ReliefError::validation(
                "threading.workers must be >= 1 when set",
            ));
        }
        if self.threading.queue_capacity == Some(0) {
            return Err(ReliefError::validation(
                "threading.queue_capacity must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
