use super::*;
use crate::foundation::core::Rgb8;

fn noise_frame(width: u32, height: u32, seed: u64) -> FrameRgb {
    let mut state = seed;
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for _ in 0..width * height * 3 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        data.push((state >> 56) as u8);
    }
    FrameRgb::new(width, height, data).unwrap()
}

fn assert_exact_tiling(frame: &FrameRgb, leaves: &[Region]) {
    let mut hits = vec![0u8; (frame.width * frame.height) as usize];
    for leaf in leaves {
        let r = leaf.rect();
        assert!(r.width() >= 1 && r.height() >= 1);
        for y in r.y1..=r.y2 {
            for x in r.x1..=r.x2 {
                hits[(y * frame.width + x) as usize] += 1;
            }
        }
    }
    assert!(hits.iter().all(|&h| h == 1), "leaves must cover each pixel exactly once");
}

#[test]
fn uniform_frame_is_a_single_leaf() {
    let f = FrameRgb::filled(4, 4, Rgb8::new(40, 90, 200)).unwrap();
    let opts = SplitOpts {
        variance_threshold: 100,
        min_size: 1,
    };
    let leaves = split_frame(&f, &opts).unwrap();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].variance(), 0);
    assert_eq!(leaves[0].rect(), PixelRect::full(&f).unwrap());
}

#[test]
fn hard_edge_splits_into_two_uniform_halves() {
    let mut f = FrameRgb::filled(2, 2, Rgb8::new(0, 0, 0)).unwrap();
    f.set_pixel(1, 0, Rgb8::new(255, 255, 255));
    f.set_pixel(1, 1, Rgb8::new(255, 255, 255));
    let opts = SplitOpts {
        variance_threshold: 100,
        min_size: 1,
    };
    let leaves = split_frame(&f, &opts).unwrap();
    assert_eq!(leaves.len(), 2);
    for leaf in &leaves {
        assert_eq!(leaf.rect().width(), 1);
        assert_eq!(leaf.rect().height(), 2);
        assert_eq!(leaf.variance(), 0);
    }
    assert_eq!(leaves[0].mean_color(), Rgb8::new(0, 0, 0));
    assert_eq!(leaves[1].mean_color(), Rgb8::new(255, 255, 255));
}

#[test]
fn noisy_frames_terminate_and_tile_exactly() {
    for (w, h, seed) in [(1, 1, 1), (1, 17, 2), (23, 1, 3), (31, 19, 4), (64, 48, 5)] {
        let f = noise_frame(w, h, seed);
        let opts = SplitOpts {
            variance_threshold: 1,
            min_size: 1,
        };
        let leaves = split_frame(&f, &opts).unwrap();
        assert_exact_tiling(&f, &leaves);
        let total: u64 = leaves.iter().map(|l| l.rect().area()).sum();
        assert_eq!(total, f.pixel_count());
        assert!(leaves.len() as u64 <= f.pixel_count());
    }
}

#[test]
fn no_leaf_larger_than_min_size_survives_on_noise() {
    let f = noise_frame(40, 30, 9);
    let opts = SplitOpts {
        variance_threshold: 1,
        min_size: 4,
    };
    let leaves = split_frame(&f, &opts).unwrap();
    assert_exact_tiling(&f, &leaves);
    for leaf in &leaves {
        if leaf.is_min_size() {
            assert_eq!(leaf.variance(), 0);
        } else {
            assert!(leaf.variance() < opts.variance_threshold);
        }
    }
}

#[test]
fn flat_halves_stop_early() {
    let mut f = FrameRgb::filled(16, 8, Rgb8::new(10, 10, 10)).unwrap();
    for y in 0..8 {
        for x in 9..16 {
            f.set_pixel(x, y, Rgb8::new(250, 250, 250));
        }
    }
    let opts = SplitOpts {
        variance_threshold: 100,
        min_size: 1,
    };
    let leaves = split_frame(&f, &opts).unwrap();
    assert_eq!(leaves.len(), 2);
    assert_exact_tiling(&f, &leaves);
}
