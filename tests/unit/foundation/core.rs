use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.frames().count(), 3);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(0, 1).is_err());
    let fps = Fps::new(30000, 1001).unwrap();
    assert!((fps.as_f64() - 29.97).abs() < 0.01);
}

#[test]
fn canvas_validate_bounds() {
    assert_eq!(
        Canvas {
            width: 64,
            height: 32
        }
        .validate()
        .unwrap(),
        (64, 32)
    );
    assert!(
        Canvas {
            width: 0,
            height: 32
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 70_000,
            height: 32
        }
        .validate()
        .is_err()
    );
}

#[test]
fn color_f_equality_is_bitwise() {
    let a = ColorF::from_rgba8(Rgba8::new(255, 0, 0, 200));
    let b = ColorF::from_rgba8(Rgba8::new(255, 0, 0, 200));
    assert_eq!(a, b);
    assert_ne!(a, a.with_alpha(0.5));
    assert!((a.a - 200.0 / 255.0).abs() < 1e-6);
}
