use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{InkError, InkResult};

/// Pressure factor used when a stroke ignores sampled pressure.
pub const DEFAULT_PRESSURE: f32 = 0.5;

/// Largest accepted nib width or height, in canvas pixels.
pub const MAX_NIB_SIZE: f64 = 162_329.4;

/// One sampled pen position.
///
/// Equality and hashing compare bit patterns so strokes can key render caches.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct StylusPoint {
    /// X in canvas pixels.
    pub x: f32,
    /// Y in canvas pixels.
    pub y: f32,
    /// Pressure factor in `[0, 1]`.
    #[serde(default = "default_pressure")]
    pub pressure: f32,
}

fn default_pressure() -> f32 {
    DEFAULT_PRESSURE
}

impl StylusPoint {
    /// Build a point, clamping pressure into `[0, 1]`.
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            x,
            y,
            pressure: if pressure.is_nan() {
                0.0
            } else {
                pressure.clamp(0.0, 1.0)
            },
        }
    }

    fn bits(self) -> [u32; 3] {
        [self.x.to_bits(), self.y.to_bits(), self.pressure.to_bits()]
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            pressure: a.pressure + (b.pressure - a.pressure) * t,
        }
    }
}

impl PartialEq for StylusPoint {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for StylusPoint {}

impl Hash for StylusPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

/// Shape of the pen nib.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StylusTip {
    /// Elliptical nib.
    #[default]
    Round,
    /// Rectangular nib.
    Square,
}

/// Style of one stroke.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct DrawingAttributes {
    /// Straight RGBA color.
    pub color: Rgba8,
    /// Nib width in canvas pixels.
    pub width: f64,
    /// Nib height in canvas pixels.
    pub height: f64,
    /// Nib shape.
    #[serde(default)]
    pub tip: StylusTip,
    /// Highlighter strokes render at half alpha.
    #[serde(default)]
    pub highlighter: bool,
    /// Expand samples into Bézier control points before rendering.
    #[serde(default)]
    pub fit_to_curve: bool,
    /// Use [`DEFAULT_PRESSURE`] instead of sampled pressure.
    #[serde(default)]
    pub ignore_pressure: bool,
}

impl Default for DrawingAttributes {
    fn default() -> Self {
        Self {
            color: Rgba8::new(0, 0, 0, 255),
            width: 2.0,
            height: 2.0,
            tip: StylusTip::Round,
            highlighter: false,
            fit_to_curve: false,
            ignore_pressure: false,
        }
    }
}

impl DrawingAttributes {
    fn key(&self) -> (Rgba8, u64, u64, StylusTip, bool, bool, bool) {
        (
            self.color,
            self.width.to_bits(),
            self.height.to_bits(),
            self.tip,
            self.highlighter,
            self.fit_to_curve,
            self.ignore_pressure,
        )
    }

    /// Check that nib dimensions lie in `(0, MAX_NIB_SIZE]`.
    pub fn validate(&self) -> InkResult<()> {
        let nib = 0.0..=MAX_NIB_SIZE;
        if !(self.width > 0.0 && nib.contains(&self.width)) {
            return Err(InkError::validation(format!(
                "stroke width must be in (0, {MAX_NIB_SIZE}], got {}",
                self.width
            )));
        }
        if !(self.height > 0.0 && nib.contains(&self.height)) {
            return Err(InkError::validation(format!(
                "stroke height must be in (0, {MAX_NIB_SIZE}], got {}",
                self.height
            )));
        }
        Ok(())
    }
}

impl PartialEq for DrawingAttributes {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for DrawingAttributes {}

impl Hash for DrawingAttributes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Immutable geometry and style of one continuous pen gesture.
///
/// Cloning is cheap: the point sequence is shared.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "StrokeRecord", into = "StrokeRecord")]
pub struct Stroke {
    points: Arc<[StylusPoint]>,
    attributes: DrawingAttributes,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct StrokeRecord {
    points: Vec<StylusPoint>,
    attributes: DrawingAttributes,
}

impl TryFrom<StrokeRecord> for Stroke {
    type Error = InkError;

    fn try_from(r: StrokeRecord) -> InkResult<Self> {
        Self::new(r.points, r.attributes)
    }
}

impl From<Stroke> for StrokeRecord {
    fn from(s: Stroke) -> Self {
        Self {
            points: s.points.to_vec(),
            attributes: s.attributes,
        }
    }
}

impl Stroke {
    /// Build a stroke from at least one finite point and a valid style.
    pub fn new(points: Vec<StylusPoint>, attributes: DrawingAttributes) -> InkResult<Self> {
        if points.is_empty() {
            return Err(InkError::validation("stroke must have at least one point"));
        }
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(InkError::validation("stroke points must be finite"));
        }
        attributes.validate()?;
        let points: Vec<StylusPoint> = points
            .into_iter()
            .map(|p| StylusPoint::new(p.x, p.y, p.pressure))
            .collect();
        Ok(Self {
            points: points.into(),
            attributes,
        })
    }

    /// Sampled points as captured.
    pub fn points(&self) -> &[StylusPoint] {
        &self.points
    }

    /// Stroke style.
    pub fn attributes(&self) -> &DrawingAttributes {
        &self.attributes
    }

    /// Same geometry with a different style.
    pub fn with_attributes(&self, attributes: DrawingAttributes) -> Self {
        Self {
            points: Arc::clone(&self.points),
            attributes,
        }
    }

    /// Pressure factor used for radius computation.
    pub fn pressure_factor(&self, p: &StylusPoint) -> f32 {
        if self.attributes.ignore_pressure {
            DEFAULT_PRESSURE
        } else {
            p.pressure
        }
    }

    /// Number of points that take part in reveal accounting.
    ///
    /// Matches `reveal_points().len()` without allocating.
    pub fn reveal_point_count(&self) -> usize {
        let n = self.points.len();
        if self.uses_curve_fit() {
            3 * (n - 1) + 1
        } else {
            n
        }
    }

    /// Points used for rendering and reveal accounting.
    ///
    /// With curve fitting and at least three samples, each span between consecutive samples is
    /// replaced by the two Catmull-Rom derived Bézier control points plus its end sample.
    pub fn reveal_points(&self) -> Vec<StylusPoint> {
        if !self.uses_curve_fit() {
            return self.points.to_vec();
        }

        let pts = &self.points;
        let n = pts.len();
        let mut out = Vec::with_capacity(3 * (n - 1) + 1);
        out.push(pts[0]);
        for i in 0..n - 1 {
            let p0 = pts[i.saturating_sub(1)];
            let p1 = pts[i];
            let p2 = pts[i + 1];
            let p3 = pts[(i + 2).min(n - 1)];

            let c1 = StylusPoint {
                x: p1.x + (p2.x - p0.x) / 6.0,
                y: p1.y + (p2.y - p0.y) / 6.0,
                pressure: StylusPoint::lerp(p1, p2, 1.0 / 3.0).pressure,
            };
            let c2 = StylusPoint {
                x: p2.x - (p3.x - p1.x) / 6.0,
                y: p2.y - (p3.y - p1.y) / 6.0,
                pressure: StylusPoint::lerp(p1, p2, 2.0 / 3.0).pressure,
            };
            out.push(c1);
            out.push(c2);
            out.push(p2);
        }
        out
    }

    fn uses_curve_fit(&self) -> bool {
        self.attributes.fit_to_curve && self.points.len() >= 3
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/stroke.rs"]
mod tests;
