use super::*;
use crate::config::SplitOpts;
use crate::foundation::core::FrameRgb;
use crate::split::region::PixelRect;

fn region(frame: &FrameRgb, rect: PixelRect) -> Region {
    Region::evaluate(frame, rect, &SplitOpts::default()).unwrap()
}

#[test]
fn height_is_area_times_factor_clamped() {
    let opts = RenderOpts {
        height_factor: 100.0,
        max_height: 30.0,
        ..RenderOpts::default()
    };
    assert_eq!(extrusion_height(0.1, &opts), 10.0);
    assert_eq!(extrusion_height(0.5, &opts), 30.0);
    assert_eq!(extrusion_height(0.0, &opts), 0.0);
}

#[test]
fn emits_five_faces_in_fixed_order() {
    let frame = FrameRgb::filled(8, 8, Rgb8::new(100, 50, 25)).unwrap();
    let opts = RenderOpts::default();
    let (w, h) = opts.canvas_size(8, 8).unwrap();
    let projector = Projector::for_canvas(w, h, &opts);
    let faces = block_faces(
        &region(&frame, PixelRect::new(2, 2, 5, 5).unwrap()),
        &projector,
        &opts,
    )
    .unwrap();

    let kinds: Vec<_> = faces.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, FaceKind::ALL.to_vec());
    for f in &faces {
        assert_eq!(f.color, shade(Rgb8::new(100, 50, 25), f.kind.lightness()));
        assert!(f.depth.is_finite());
    }
}

#[test]
fn face_depth_is_the_nearest_corner() {
    let frame = FrameRgb::filled(4, 4, Rgb8::new(10, 10, 10)).unwrap();
    let opts = RenderOpts::default();
    let (w, h) = opts.canvas_size(4, 4).unwrap();
    let projector = Projector::for_canvas(w, h, &opts);
    let r = region(&frame, PixelRect::new(0, 0, 3, 3).unwrap());
    let faces = block_faces(&r, &projector, &opts).unwrap();

    let scale = f64::from(opts.scale);
    let border = f64::from(opts.border);
    let y_front = 4.0 * scale + border;
    let nearest_front_corner = [border, 4.0 * scale + border]
        .iter()
        .map(|&x| projector.project(x, y_front, 0.0).unwrap().depth)
        .fold(f64::INFINITY, f64::min);
    let front = faces.iter().find(|f| f.kind == FaceKind::Front).unwrap();
    assert!(front.depth <= nearest_front_corner);

    // The front face is nearer than the back face of the same block.
    let back = faces.iter().find(|f| f.kind == FaceKind::Back).unwrap();
    assert!(front.depth < back.depth);
}

#[test]
fn flat_block_collapses_side_faces() {
    let frame = FrameRgb::filled(4, 4, Rgb8::new(10, 10, 10)).unwrap();
    let opts = RenderOpts {
        height_factor: 0.0,
        ..RenderOpts::default()
    };
    let (w, h) = opts.canvas_size(4, 4).unwrap();
    let projector = Projector::for_canvas(w, h, &opts);
    let r = region(&frame, PixelRect::new(0, 0, 3, 3).unwrap());
    let faces = block_faces(&r, &projector, &opts).unwrap();
    let front = faces.iter().find(|f| f.kind == FaceKind::Front).unwrap();
    assert_eq!(front.corners[0], front.corners[3]);
    assert_eq!(front.corners[1], front.corners[2]);
}
