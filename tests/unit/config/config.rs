use super::*;

#[test]
fn defaults_validate() {
    ReliefConfig::default().validate().unwrap();
}

#[test]
fn partial_json_keeps_other_defaults() {
    let cfg = ReliefConfig::from_json_str(
        r#"{ "split": { "variance_threshold": 40 }, "threading": { "workers": 3 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.split.variance_threshold, 40);
    assert_eq!(cfg.split.min_size, SplitOpts::default().min_size);
    assert_eq!(cfg.render, RenderOpts::default());
    assert_eq!(cfg.threading.worker_count(), 3);
    assert_eq!(cfg.threading.queue_capacity_for(3), 6);
    assert_eq!(cfg.threading.in_flight_limit(3), 12);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = ReliefConfig::from_json_str(r#"{ "split": { "threshold": 1 } }"#).unwrap_err();
    assert!(err.to_string().contains("invalid config JSON"));
}

#[test]
fn zero_threshold_and_min_size_are_rejected() {
    let mut cfg = ReliefConfig::default();
    cfg.split.variance_threshold = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = ReliefConfig::default();
    cfg.split.min_size = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn bad_camera_is_rejected() {
    let mut cfg = ReliefConfig::default();
    cfg.render.view_distance = 0.0;
    assert!(cfg.validate().is_err());

    let mut cfg = ReliefConfig::default();
    cfg.render.tilt_radians = std::f64::consts::FRAC_PI_2;
    assert!(cfg.validate().is_err());

    let mut cfg = ReliefConfig::default();
    cfg.render.max_height = f64::NAN;
    assert!(cfg.validate().is_err());
}

#[test]
fn zero_workers_is_rejected() {
    let mut cfg = ReliefConfig::default();
    cfg.threading.workers = Some(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn default_worker_count_is_at_least_one() {
    assert!(ThreadingOpts::default().worker_count() >= 1);
}

#[test]
fn canvas_size_adds_scale_and_border() {
    let r = RenderOpts {
        scale: 3,
        border: 10,
        ..RenderOpts::default()
    };
    assert_eq!(r.canvas_size(4, 2).unwrap(), (32, 26));
    assert!(r.canvas_size(30_000, 2).is_err());
}

#[test]
fn config_file_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relief.json");
    std::fs::write(&path, r#"{ "render": { "scale": 1, "background": { "r": 1, "g": 2, "b": 3 } } }"#)
        .unwrap();
    let cfg = ReliefConfig::from_json_path(&path).unwrap();
    assert_eq!(cfg.render.scale, 1);
    assert_eq!(cfg.render.background, Rgb8::new(1, 2, 3));

    let missing = ReliefConfig::from_json_path(&dir.path().join("nope.json")).unwrap_err();
    assert!(missing.to_string().contains("failed to read config"));
}
