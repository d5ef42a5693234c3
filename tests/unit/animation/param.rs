use super::*;
use crate::animation::anim::{Keyframe, Keyframes, InterpMode};
use crate::animation::ease::Ease;
use crate::foundation::core::FrameIndex;

fn ctx(frame: u64) -> SampleCtx {
    SampleCtx {
        frame: FrameIndex(frame),
        duration: 60,
    }
}

#[test]
fn defaults_match_authoring_ranges() {
    assert_eq!(Param::thickness().value_at(ctx(0)).unwrap(), 100.0);
    assert_eq!(Param::length().value_at(ctx(0)).unwrap(), 100.0);
    assert_eq!(Param::offset().value_at(ctx(0)).unwrap(), 0.0);
}

#[test]
fn samples_are_clamped_into_bounds() {
    let mut p = Param::length();
    p.anim = Anim::Keyframes(Keyframes {
        keys: vec![
            Keyframe {
                frame: FrameIndex(0),
                value: -50.0,
                ease: Ease::Linear,
            },
            Keyframe {
                frame: FrameIndex(10),
                value: 250.0,
                ease: Ease::Linear,
            },
        ],
        mode: InterpMode::Linear,
    });
    assert_eq!(p.value_at(ctx(0)).unwrap(), 0.0);
    assert_eq!(p.value_at(ctx(10)).unwrap(), 100.0);
}

#[test]
fn nan_resolves_to_min() {
    let p = Param::new(f64::NAN, 0.1, 10.0);
    assert_eq!(p.value_at(ctx(0)).unwrap(), 0.1);
}

#[test]
fn validate_rejects_inverted_bounds() {
    assert!(Param::new(1.0, 5.0, 1.0).validate().is_err());
    assert!(Param::thickness().validate().is_ok());
}
