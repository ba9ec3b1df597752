use crate::config::RenderOpts;
use crate::foundation::core::{Point, Rgb8};
use crate::foundation::error::ReliefResult;
use crate::render::projection::{Projected, Projector};
use crate::render::shade::shade;
use crate::split::region::Region;

/// Which side of an extruded block a face belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceKind {
    Top,
    /// Facing the camera (the region's bottom edge in the source frame).
    Front,
    Back,
    Left,
    Right,
}

impl FaceKind {
    /// Emission order within one block.
    pub const ALL: [FaceKind; 5] = [
        FaceKind::Top,
        FaceKind::Front,
        FaceKind::Back,
        FaceKind::Left,
        FaceKind::Right,
    ];

    /// HSL lightness multiplier applied to the region's mean color.
    pub fn lightness(self) -> f64 {
        match self {
            FaceKind::Top => 1.0,
            FaceKind::Front => 0.8,
            FaceKind::Back => 1.2,
            FaceKind::Left => 1.4,
            FaceKind::Right => 0.6,
        }
    }
}

/// One projected, shaded quadrilateral.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
    pub kind: FaceKind,
    pub corners: [Point; 4],
    pub color: Rgb8,
    /// Depth of the nearest corner.
    pub depth: f64,
}

/// Extrusion height for a region covering `area_fraction` of the frame.
pub fn extrusion_height(area_fraction: f64, opts: &RenderOpts) -> f64 {
    (area_fraction * opts.height_factor).min(opts.max_height)
}

/// Build all five faces of the block extruded from `region`.
///
/// Every face is emitted regardless of whether it points toward the camera; hidden faces are
/// covered later by the depth-sorted paint.
pub fn block_faces(
    region: &Region,
    projector: &Projector,
    opts: &RenderOpts,
) -> ReliefResult<[Face; 5]> {
    let rect = region.rect();
    let scale = f64::from(opts.scale);
    let border = f64::from(opts.border);
    let x1 = f64::from(rect.x1) * scale + border;
    let y1 = f64::from(rect.y1) * scale + border;
    let x2 = f64::from(rect.x2 + 1) * scale + border;
    let y2 = f64::from(rect.y2 + 1) * scale + border;
    let h = extrusion_height(region.area_fraction(), opts);

    // Corner naming: [b]ottom/[t]op, then back-left, back-right, front-right, front-left.
    let p = |x, y, z| projector.project(x, y, z);
    let b_bl = p(x1, y1, 0.0)?;
    let b_br = p(x2, y1, 0.0)?;
    let b_fr = p(x2, y2, 0.0)?;
    let b_fl = p(x1, y2, 0.0)?;
    let t_bl = p(x1, y1, h)?;
    let t_br = p(x2, y1, h)?;
    let t_fr = p(x2, y2, h)?;
    let t_fl = p(x1, y2, h)?;

    let base = region.mean_color();
    let face = |kind: FaceKind, q: [Projected; 4]| Face {
        kind,
        corners: q.map(|c| c.point),
        color: shade(base, kind.lightness()),
        depth: q.iter().map(|c| c.depth).fold(f64::INFINITY, f64::min),
    };

    Ok([
        face(FaceKind::Top, [t_bl, t_br, t_fr, t_fl]),
        face(FaceKind::Front, [b_fl, b_fr, t_fr, t_fl]),
        face(FaceKind::Back, [b_bl, b_br, t_br, t_bl]),
        face(FaceKind::Left, [b_bl, b_fl, t_fl, t_bl]),
        face(FaceKind::Right, [b_br, b_fr, t_fr, t_br]),
    ])
}

#[cfg(test)]
#[path = "../../tests/unit/render/block.rs"]
mod tests;
