use crate::foundation::error::{InkError, InkResult};

/// Timing curve applied between two keyframes of a reveal parameter.
///
/// Serialized internally tagged, e.g. `{"kind": "out", "power": 2}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Ease {
    /// Constant speed.
    #[default]
    Linear,
    /// Slow start, `t^power`.
    In {
        /// Exponent, at least 1.
        power: u8,
    },
    /// Slow finish, mirror of [`Ease::In`].
    Out {
        /// Exponent, at least 1.
        power: u8,
    },
    /// Slow start and finish, symmetric around `t = 0.5`.
    InOut {
        /// Exponent, at least 1.
        power: u8,
    },
    /// Hermite smoothstep `3t² - 2t³`.
    Smoothstep,
    /// CSS-style timing curve through `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)`.
    CubicBezier {
        /// First control point x, in `[0, 1]`.
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x, in `[0, 1]`.
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
}

impl Ease {
    /// Reject exponents of 0 and Bézier curves that are not functions of time.
    pub fn validate(self) -> InkResult<()> {
        match self {
            Self::In { power } | Self::Out { power } | Self::InOut { power } if power == 0 => {
                Err(InkError::validation("ease power must be >= 1"))
            }
            Self::CubicBezier { x1, y1, x2, y2 } => {
                if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
                    return Err(InkError::validation("cubic-bezier control points must be finite"));
                }
                if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                    return Err(InkError::validation("cubic-bezier x must be within [0, 1]"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Map progress `t` (clamped to `[0, 1]`) through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::In { power } => t.powi(i32::from(power)),
            Self::Out { power } => 1.0 - (1.0 - t).powi(i32::from(power)),
            Self::InOut { power } => {
                let p = i32::from(power);
                if t < 0.5 {
                    (2.0 * t).powi(p) / 2.0
                } else {
                    1.0 - (2.0 - 2.0 * t).powi(p) / 2.0
                }
            }
            Self::Smoothstep => t * t * (3.0 - 2.0 * t),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                let s = solve_bezier_param(t, x1, x2);
                bezier_1d(s, y1, y2)
            }
        }
    }
}

fn bezier_1d(s: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - s;
    3.0 * u * u * s * p1 + 3.0 * u * s * s * p2 + s * s * s
}

/// Curve parameter whose x equals `x`. x(s) is monotone for control x in `[0, 1]`.
fn solve_bezier_param(x: f64, x1: f64, x2: f64) -> f64 {
    let (mut lo, mut hi) = (0.0, 1.0);
    let mut s = x;
    for _ in 0..48 {
        let err = bezier_1d(s, x1, x2) - x;
        if err.abs() < 1e-9 {
            break;
        }
        if err > 0.0 {
            hi = s;
        } else {
            lo = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
