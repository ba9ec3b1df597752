//! Block-relief rendering: extrude each leaf region, project it, and paint back-to-front.

pub mod block;
pub mod painter;
pub mod projection;
pub mod shade;

use crate::config::{RenderOpts, SplitOpts};
use crate::foundation::core::FrameRgb;
use crate::foundation::error::ReliefResult;
use crate::render::block::{Face, block_faces};
use crate::render::painter::paint_faces;
use crate::render::projection::Projector;
use crate::split::region::Region;
use crate::split::splitter::split_frame;

/// Runs region splitting and block rendering for single frames.
///
/// Holds no per-frame state, so one renderer can be shared by every worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReliefRenderer {
    split: SplitOpts,
    render: RenderOpts,
}

impl ReliefRenderer {
    pub fn new(split: SplitOpts, render: RenderOpts) -> Self {
        Self { split, render }
    }

    pub fn render_opts(&self) -> &RenderOpts {
        &self.render
    }

    /// Output frame size for an input of `width x height`.
    pub fn output_size(&self, width: u32, height: u32) -> ReliefResult<(u32, u32)> {
        self.render.canvas_size(width, height)
    }

    /// Faces for every region, in region order, five per region.
    pub fn faces_for(&self, regions: &[Region], canvas: (u32, u32)) -> ReliefResult<Vec<Face>> {
        let projector = Projector::for_canvas(canvas.0, canvas.1, &self.render);
        let mut faces = Vec::with_capacity(regions.len() * 5);
        for region in regions {
            faces.extend(block_faces(region, &projector, &self.render)?);
        }
        Ok(faces)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(width = frame.width, height = frame.height))]
    pub fn render(&self, frame: &FrameRgb) -> ReliefResult<FrameRgb> {
        let canvas = self.output_size(frame.width, frame.height)?;
        let regions = split_frame(frame, &self.split)?;
        let mut faces = self.faces_for(&regions, canvas)?;
        tracing::trace!(regions = regions.len(), faces = faces.len(), "painting");
        paint_faces(&mut faces, canvas.0, canvas.1, self.render.background)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
