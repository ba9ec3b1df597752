//! Fixed tilted pinhole camera.
//!
//! All 3D math in the crate goes through [`Projector::project`].

use crate::config::RenderOpts;
use crate::foundation::core::Point;
use crate::foundation::error::{ReliefError, ReliefResult};

/// A screen-space point plus the depth key used for back-to-front ordering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub point: Point,
    /// Squared distance of the tilted point from the camera.
    pub depth: f64,
}

/// Maps `(x, y, height)` on the output canvas to screen space.
///
/// Canvas `y` becomes camera depth (larger `y` is nearer), and extrusion height becomes the
/// vertical axis. The scene is then rotated about the horizontal axis by the tilt angle and
/// perspective-divided by `view_distance`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    view_width: f64,
    view_height: f64,
    view_distance: f64,
    cos_tilt: f64,
    sin_tilt: f64,
}

impl Projector {
    pub fn new(view_width: f64, view_height: f64, view_distance: f64, tilt_radians: f64) -> Self {
        Self {
            view_width,
            view_height,
            view_distance,
            cos_tilt: tilt_radians.cos(),
            sin_tilt: tilt_radians.sin(),
        }
    }

    /// Camera for a canvas of `width x height` using the configured tilt and distance.
    pub fn for_canvas(width: u32, height: u32, opts: &RenderOpts) -> Self {
        Self::new(
            f64::from(width),
            f64::from(height),
            opts.view_distance,
            opts.tilt_radians,
        )
    }

    pub fn project(&self, x: f64, y: f64, h: f64) -> ReliefResult<Projected> {
        let half_w = self.view_width / 2.0;
        let half_h = self.view_height / 2.0;

        let xc = x - half_w;
        let yc = h - half_h;
        let zc = self.view_distance + self.view_height - y;

        let xt = xc;
        let yt = yc * self.cos_tilt + zc * self.sin_tilt;
        let zt = zc * self.cos_tilt - yc * self.sin_tilt;
        if zt.is_nan() || zt <= f64::EPSILON {
            return Err(ReliefError::geometry(format!(
                "point ({x}, {y}, {h}) projects behind the camera (z = {zt})"
            )));
        }

        let sx = xt * self.view_distance / zt;
        let sy = yt * self.view_distance / zt;
        Ok(Projected {
            point: Point::new(sx + half_w, -sy + half_h),
            depth: xt * xt + yt * yt + zt * zt,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/projection.rs"]
mod tests;
