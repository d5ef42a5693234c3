use crate::animation::anim::{Anim, SampleCtx};
use crate::foundation::error::{InkError, InkResult};

/// Upper bound used for parameters that are effectively unbounded.
pub const PARAM_LARGE: f64 = 100_000.0;

/// A host-animated scalar with `[min, max]` bounds applied after sampling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Param {
    /// Animated value source.
    pub anim: Anim<f64>,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl Param {
    /// Constant parameter with bounds.
    pub fn new(value: f64, min: f64, max: f64) -> Self {
        Self {
            anim: Anim::constant(value),
            min,
            max,
        }
    }

    /// Stroke thickness in percent; 100 keeps authored widths.
    pub fn thickness() -> Self {
        Self::new(100.0, 0.1, PARAM_LARGE)
    }

    /// Revealed length in percent of all stroke points.
    pub fn length() -> Self {
        Self::new(100.0, 0.0, 100.0)
    }

    /// Reveal start offset in percent; wraps every 200%.
    pub fn offset() -> Self {
        Self::new(0.0, -PARAM_LARGE, PARAM_LARGE)
    }

    /// Validate bounds and the animation itself.
    pub fn validate(&self) -> InkResult<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(InkError::validation("Param bounds must be finite with min <= max"));
        }
        self.anim.validate()
    }

    /// Sample at `ctx` and clamp into bounds. NaN samples resolve to `min`.
    pub fn value_at(&self, ctx: SampleCtx) -> InkResult<f64> {
        let v = self.anim.sample(ctx)?;
        if v.is_nan() {
            return Ok(self.min);
        }
        Ok(v.clamp(self.min, self.max))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/param.rs"]
mod tests;
