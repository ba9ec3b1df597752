use super::*;

fn opts(min_size: u32) -> SplitOpts {
    SplitOpts {
        variance_threshold: 100,
        min_size,
    }
}

fn half_black_half_white() -> FrameRgb {
    let mut f = FrameRgb::filled(2, 2, Rgb8::new(0, 0, 0)).unwrap();
    f.set_pixel(1, 0, Rgb8::new(255, 255, 255));
    f.set_pixel(1, 1, Rgb8::new(255, 255, 255));
    f
}

#[test]
fn midpoint_rounds_half_up_but_keeps_both_halves() {
    assert_eq!(midpoint(0, 4).unwrap(), 2);
    assert_eq!(midpoint(0, 3).unwrap(), 2);
    assert_eq!(midpoint(3, 4).unwrap(), 3);
    assert_eq!(midpoint(0, 1).unwrap(), 0);
    assert!(midpoint(5, 5).is_err());
}

#[test]
fn split_picks_the_longer_side() {
    let tall = PixelRect::new(0, 0, 1, 5).unwrap();
    let (top, bottom) = tall.split().unwrap();
    assert_eq!(top, PixelRect::new(0, 0, 1, 3).unwrap());
    assert_eq!(bottom, PixelRect::new(0, 4, 1, 5).unwrap());

    let square = PixelRect::new(0, 0, 1, 1).unwrap();
    let (left, right) = square.split().unwrap();
    assert_eq!(left, PixelRect::new(0, 0, 0, 1).unwrap());
    assert_eq!(right, PixelRect::new(1, 0, 1, 1).unwrap());
}

#[test]
fn single_pixel_cannot_split() {
    let px = PixelRect::new(3, 3, 3, 3).unwrap();
    assert!(matches!(px.split(), Err(ReliefError::Geometry(_))));
}

#[test]
fn inverted_rect_is_a_geometry_error() {
    assert!(matches!(
        PixelRect::new(2, 0, 1, 0),
        Err(ReliefError::Geometry(_))
    ));
}

#[test]
fn hard_edge_reports_full_channel_sum_range() {
    let f = half_black_half_white();
    let r = Region::evaluate(&f, PixelRect::full(&f).unwrap(), &opts(1)).unwrap();
    assert_eq!(r.variance(), 255 * 3);
    assert!(!r.is_leaf(&opts(1)));
    assert_eq!(r.mean_color(), Rgb8::new(128, 128, 128));
    assert_eq!(r.area_fraction(), 1.0);
}

#[test]
fn min_size_region_reports_zero_variance() {
    let f = half_black_half_white();
    let r = Region::evaluate(&f, PixelRect::full(&f).unwrap(), &opts(2)).unwrap();
    assert!(r.is_min_size());
    assert_eq!(r.variance(), 0);
    assert!(r.is_leaf(&opts(2)));
}

#[test]
fn thin_strip_outside_min_size_keeps_its_variance() {
    let mut f = FrameRgb::filled(1, 8, Rgb8::new(0, 0, 0)).unwrap();
    f.set_pixel(0, 7, Rgb8::new(10, 20, 30));
    let r = Region::evaluate(&f, PixelRect::full(&f).unwrap(), &opts(5)).unwrap();
    assert!(!r.is_min_size());
    assert_eq!(r.variance(), 60);
}

#[test]
fn area_fraction_is_relative_to_the_frame() {
    let f = FrameRgb::filled(4, 4, Rgb8::new(9, 9, 9)).unwrap();
    let r = Region::evaluate(&f, PixelRect::new(0, 0, 1, 1).unwrap(), &opts(1)).unwrap();
    assert_eq!(r.area_fraction(), 0.25);
}

#[test]
fn out_of_frame_rect_is_rejected() {
    let f = FrameRgb::filled(4, 4, Rgb8::new(0, 0, 0)).unwrap();
    let rect = PixelRect::new(0, 0, 4, 1).unwrap();
    assert!(Region::evaluate(&f, rect, &opts(1)).is_err());
}

#[test]
fn variance_compares_channel_sums_not_single_channels() {
    // Pure red and pure blue share one channel sum, so the strip counts as flat.
    let mut f = FrameRgb::filled(8, 1, Rgb8::new(255, 0, 0)).unwrap();
    for x in 4..8 {
        f.set_pixel(x, 0, Rgb8::new(0, 0, 255));
    }
    let r = Region::evaluate(&f, PixelRect::full(&f).unwrap(), &opts(1)).unwrap();
    assert_eq!(r.variance(), 0);
    assert_eq!(r.mean_color(), Rgb8::new(128, 0, 128));
}
