use crate::foundation::core::{FrameRgb, Point, Rgb8, rgb_len};
use crate::foundation::error::{ReliefError, ReliefResult};
use crate::render::block::Face;

/// Coverage (out of 255) at which a face claims a pixel. Below half, so one of two faces
/// splitting a pixel always reaches it.
const COVERAGE_THRESHOLD: u8 = 127;

/// Sort faces far-to-near. The sort is stable, so equal depths keep emission order.
pub fn sort_back_to_front(faces: &mut [Face]) {
    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}

/// Paint `faces` over a `background`-filled canvas with the painter's algorithm.
///
/// Faces are sorted in place first; later (nearer) faces overwrite earlier ones. Fills are
/// aliased: a face paints every pixel it covers by about half or more, so two faces sharing an
/// edge leave no background seam between them.
pub fn paint_faces(
    faces: &mut [Face],
    width: u32,
    height: u32,
    background: Rgb8,
) -> ReliefResult<FrameRgb> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReliefError::validation("canvas width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReliefError::validation("canvas height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(ReliefError::validation("canvas width/height must be non-zero"));
    }

    sort_back_to_front(faces);

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_aliasing_threshold(Some(COVERAGE_THRESHOLD));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(to_cpu_color(background));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(w),
        f64::from(h),
    ));

    for face in faces.iter() {
        ctx.set_paint(to_cpu_color(face.color));
        ctx.fill_path(&quad_to_cpu(&face.corners));
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    let rgba = pixmap.data_as_u8_slice();
    let mut data = Vec::with_capacity(rgb_len(width, height));
    // Background is opaque, so premultiplied RGBA equals straight RGB here.
    for px in rgba.chunks_exact(4) {
        data.extend_from_slice(&px[..3]);
    }
    FrameRgb::new(width, height, data)
}

fn to_cpu_color(c: Rgb8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255)
}

fn quad_to_cpu(corners: &[Point; 4]) -> vello_cpu::kurbo::BezPath {
    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    out.move_to(pt(corners[0]));
    for &c in &corners[1..] {
        out.line_to(pt(c));
    }
    out.close_path();
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
