use super::*;

const CURVES: [Ease; 7] = [
    Ease::Linear,
    Ease::In { power: 2 },
    Ease::Out { power: 3 },
    Ease::InOut { power: 2 },
    Ease::Smoothstep,
    Ease::CubicBezier {
        x1: 0.25,
        y1: 0.1,
        x2: 0.25,
        y2: 1.0,
    },
    Ease::CubicBezier {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 1.0,
    },
];

#[test]
fn endpoints_are_fixed() {
    for ease in CURVES {
        assert!(ease.apply(0.0).abs() < 1e-6, "{ease:?}");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{ease:?}");
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::Linear.apply(-1.0), 0.0);
    assert_eq!(Ease::In { power: 2 }.apply(2.0), 1.0);
    assert_eq!(Ease::Smoothstep.apply(f64::NAN), 0.0);
}

#[test]
fn symmetric_curves_pass_through_the_midpoint() {
    assert!((Ease::InOut { power: 3 }.apply(0.5) - 0.5).abs() < 1e-12);
    assert!((Ease::Smoothstep.apply(0.5) - 0.5).abs() < 1e-12);
    let diagonal = Ease::CubicBezier {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 1.0,
    };
    assert!((diagonal.apply(0.3) - 0.3).abs() < 1e-6);
}

#[test]
fn in_and_out_bend_opposite_ways() {
    assert!(Ease::In { power: 2 }.apply(0.5) < 0.5);
    assert!(Ease::Out { power: 2 }.apply(0.5) > 0.5);
}

#[test]
fn validate_rejects_degenerate_curves() {
    assert!(Ease::In { power: 0 }.validate().is_err());
    assert!(
        Ease::CubicBezier {
            x1: 1.5,
            y1: 0.0,
            x2: 0.5,
            y2: 1.0
        }
        .validate()
        .is_err()
    );
    assert!(
        Ease::CubicBezier {
            x1: f64::NAN,
            y1: 0.0,
            x2: 0.5,
            y2: 1.0
        }
        .validate()
        .is_err()
    );
    for ease in CURVES {
        ease.validate().unwrap();
    }
}

#[test]
fn serializes_with_kind_tag() {
    let json = serde_json::to_string(&Ease::Out { power: 2 }).unwrap();
    assert_eq!(json, r#"{"kind":"out","power":2}"#);
    let back: Ease = serde_json::from_str(r#"{"kind":"linear"}"#).unwrap();
    assert_eq!(back, Ease::Linear);
}
