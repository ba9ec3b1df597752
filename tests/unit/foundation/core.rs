use super::*;

#[test]
fn fps_parses_ffprobe_rationals() {
    assert_eq!(Fps::parse_rational("30000/1001").unwrap(), Fps::new(30000, 1001).unwrap());
    assert_eq!(Fps::parse_rational("25").unwrap(), Fps::new(25, 1).unwrap());
    assert!(Fps::parse_rational("0/0").is_err());
    assert!(Fps::parse_rational("abc").is_err());
}

#[test]
fn frame_rejects_wrong_buffer_length() {
    assert!(FrameRgb::new(2, 2, vec![0; 11]).is_err());
    assert!(FrameRgb::new(0, 2, vec![]).is_err());
    assert!(FrameRgb::new(2, 2, vec![0; 12]).is_ok());
}

#[test]
fn pixel_accessors_are_row_major() {
    let mut f = FrameRgb::filled(3, 2, Rgb8::new(1, 2, 3)).unwrap();
    f.set_pixel(2, 1, Rgb8::new(9, 8, 7));
    assert_eq!(f.pixel(2, 1), Rgb8::new(9, 8, 7));
    assert_eq!(&f.data[15..18], &[9, 8, 7]);
    assert_eq!(f.pixel(0, 0), Rgb8::new(1, 2, 3));
}

#[test]
fn frame_seq_counts_from_one() {
    assert_eq!(FrameSeq::FIRST.next(), FrameSeq(2));
    assert_eq!(FrameSeq(12).to_string(), "12");
}

#[test]
fn channel_sum_adds_all_three_channels() {
    assert_eq!(Rgb8::from([255, 255, 255]).channel_sum(), 765);
    assert_eq!(Rgb8::from([10, 20, 30]), Rgb8::new(10, 20, 30));
}
