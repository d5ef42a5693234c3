use crate::{
    animation::ease::Ease,
    foundation::core::FrameIndex,
    foundation::error::{InkError, InkResult},
};

/// Sampling context handed over by the host for one output frame.
#[derive(Clone, Copy, Debug)]
pub struct SampleCtx {
    /// Item-local frame index.
    pub frame: FrameIndex,
    /// Item duration in frames; sampling past the end holds the last frame.
    pub duration: u64,
}

impl SampleCtx {
    /// `frame` clamped into the item, `[0, duration)`.
    pub fn local_frame(self) -> u64 {
        self.frame.0.min(self.duration.saturating_sub(1))
    }
}

/// Interpolation contract for animation value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

/// Animated value: either a constant or a keyframe track.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Anim<T> {
    /// Same value on every frame.
    Constant(T),
    /// Piecewise animation defined by explicit keyframes.
    Keyframes(Keyframes<T>),
}

impl<T> Anim<T>
where
    T: Lerp + Clone,
{
    /// Build a constant animation that always returns `value`.
    pub fn constant(value: T) -> Self {
        Self::Constant(value)
    }

    /// Sample animation value at the given context.
    pub fn sample(&self, ctx: SampleCtx) -> InkResult<T> {
        match self {
            Self::Constant(v) => Ok(v.clone()),
            Self::Keyframes(kf) => kf.sample(ctx),
        }
    }

    /// Validate static invariants for this animation.
    pub fn validate(&self) -> InkResult<()> {
        match self {
            Self::Constant(_) => Ok(()),
            Self::Keyframes(kf) => kf.validate(),
        }
    }
}

/// Keyframed animation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframes<T> {
    /// Keyframes sorted by `frame`.
    pub keys: Vec<Keyframe<T>>, // sorted by frame
    /// Interpolation mode between adjacent keyframes.
    pub mode: InterpMode,
}

impl<T> Keyframes<T>
where
    T: Lerp + Clone,
{
    /// Validate keyframe ordering.
    pub fn validate(&self) -> InkResult<()> {
        if self.keys.is_empty() {
            return Err(InkError::validation("Keyframes must have at least one key"));
        }
        if !self.keys.windows(2).all(|w| w[0].frame.0 <= w[1].frame.0) {
            return Err(InkError::validation(
                "Keyframes keys must be sorted by frame",
            ));
        }
        self.keys.iter().try_for_each(|k| k.ease.validate())
    }

    /// Sample keyframed value in item-local time.
    pub fn sample(&self, ctx: SampleCtx) -> InkResult<T> {
        if self.keys.is_empty() {
            return Err(InkError::validation("Keyframes has no keys"));
        }

        let f = ctx.local_frame();
        let idx = self.keys.partition_point(|k| k.frame.0 <= f);

        if idx == 0 {
            return Ok(self.keys[0].value.clone());
        }
        if idx >= self.keys.len() {
            return Ok(self.keys[self.keys.len() - 1].value.clone());
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let denom = b.frame.0.saturating_sub(a.frame.0);
        if denom == 0 {
            return Ok(a.value.clone());
        }

        let t = ((f - a.frame.0) as f64) / (denom as f64);
        match self.mode {
            InterpMode::Hold => Ok(a.value.clone()),
            InterpMode::Linear => Ok(T::lerp(&a.value, &b.value, a.ease.apply(t))),
        }
    }
}

/// One keyframe in a keyframed animation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    /// Item-local frame index for this key.
    pub frame: FrameIndex,
    /// Value at `frame`.
    pub value: T,
    /// Easing applied toward the next keyframe.
    #[serde(default)]
    pub ease: Ease,
}

/// Interpolation strategy between keyframes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InterpMode {
    /// Hold the previous key value until the next keyframe.
    Hold,
    /// Interpolate between keyframes using [`Ease`].
    Linear,
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
