use std::hash::{Hash, Hasher};
use std::sync::Arc;

use kurbo::BezPath;
use xxhash_rust::xxh3::Xxh3;

use crate::foundation::error::{InkError, InkResult};
use crate::render::style::{InkStyle, NibShape};

const XXH3_SEED: u64 = 0x3c6e_f372_fe94_f82b;
const CURVE_STEPS: usize = 8;
const MIN_NIB_SIDES: usize = 8;
const MAX_NIB_SIDES: usize = 48;

/// A point of ink geometry: position plus nib radius.
#[derive(Clone, Copy, Debug)]
pub struct InkPoint {
    /// X in canvas pixels.
    pub x: f32,
    /// Y in canvas pixels.
    pub y: f32,
    /// Nib radius in canvas pixels.
    pub radius: f32,
}

impl InkPoint {
    fn bits(self) -> [u32; 3] {
        [self.x.to_bits(), self.y.to_bits(), self.radius.to_bits()]
    }

    fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.radius.is_finite() && self.radius >= 0.0
    }
}

impl PartialEq for InkPoint {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for InkPoint {}

impl Hash for InkPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

/// Structural cache key for ink geometry.
///
/// Hashing uses a precomputed xxh3 digest of the point array; equality still compares every point.
#[derive(Clone, Debug)]
pub struct GeometryKey {
    digest: u64,
    points: Arc<[InkPoint]>,
}

impl GeometryKey {
    /// Build a key from revealed ink points.
    pub fn new(points: Vec<InkPoint>) -> Self {
        let mut h = Xxh3::with_seed(XXH3_SEED);
        h.update(&(points.len() as u64).to_le_bytes());
        for p in &points {
            for b in p.bits() {
                h.update(&b.to_le_bytes());
            }
        }
        Self {
            digest: h.digest(),
            points: points.into(),
        }
    }

    /// Points carried by this key.
    pub fn points(&self) -> &[InkPoint] {
        &self.points
    }
}

impl PartialEq for GeometryKey {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.points == other.points
    }
}

impl Eq for GeometryKey {}

impl Hash for GeometryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.digest);
    }
}

/// One cubic ink segment continuing from the previous segment's end point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InkSegment {
    /// First control point.
    pub p1: InkPoint,
    /// Second control point.
    pub p2: InkPoint,
    /// End point.
    pub p3: InkPoint,
}

/// Curved-ribbon ink primitive: a start point plus one segment per consecutive point pair.
///
/// A single-point input yields one zero-length segment (a dot).
#[derive(Clone, Debug, PartialEq)]
pub struct InkGeometry {
    start: InkPoint,
    segments: Vec<InkSegment>,
}

impl InkGeometry {
    /// Build geometry from at least one valid point.
    pub fn build(points: &[InkPoint]) -> InkResult<Self> {
        let Some(&start) = points.first() else {
            return Err(InkError::resource("ink geometry needs at least one point"));
        };
        if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
            return Err(InkError::resource(format!(
                "ink point is not drawable: {bad:?}"
            )));
        }

        let segments = if points.len() == 1 {
            vec![InkSegment {
                p1: start,
                p2: start,
                p3: start,
            }]
        } else {
            points
                .windows(2)
                .map(|w| InkSegment {
                    p1: w[0],
                    p2: w[1],
                    p3: w[1],
                })
                .collect()
        };
        Ok(Self { start, segments })
    }

    /// Start point.
    pub fn start(&self) -> InkPoint {
        self.start
    }

    /// Segments in drawing order.
    pub fn segments(&self) -> &[InkSegment] {
        &self.segments
    }

    /// Fillable outline for `style`, using the non-zero fill rule.
    ///
    /// Every sub-path is the convex hull of two consecutive nib footprints, so all sub-paths share
    /// the same winding and overlapping parts do not cancel.
    pub fn outline(&self, style: &InkStyle) -> BezPath {
        let mut path = BezPath::new();
        let mut prev = self.start;
        for seg in &self.segments {
            let steps = if is_straight(prev, seg) { 1 } else { CURVE_STEPS };
            let mut a = prev;
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                let b = cubic_at(prev, seg, t);
                push_hull(&mut path, &swept_nib(a, b, style));
                a = b;
            }
            prev = seg.p3;
        }
        path
    }
}

fn is_straight(start: InkPoint, seg: &InkSegment) -> bool {
    seg.p1 == start && seg.p2 == seg.p3
}

fn cubic_at(p0: InkPoint, seg: &InkSegment, t: f32) -> InkPoint {
    let mt = 1.0 - t;
    let w0 = mt * mt * mt;
    let w1 = 3.0 * mt * mt * t;
    let w2 = 3.0 * mt * t * t;
    let w3 = t * t * t;
    InkPoint {
        x: w0 * p0.x + w1 * seg.p1.x + w2 * seg.p2.x + w3 * seg.p3.x,
        y: w0 * p0.y + w1 * seg.p1.y + w2 * seg.p2.y + w3 * seg.p3.y,
        radius: w0 * p0.radius + w1 * seg.p1.radius + w2 * seg.p2.radius + w3 * seg.p3.radius,
    }
}

fn nib_footprint(p: InkPoint, style: &InkStyle, out: &mut Vec<(f64, f64)>) {
    let rx = f64::from(p.radius);
    let ry = rx * style.aspect;
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let (cx, cy) = (f64::from(p.x), f64::from(p.y));
    match style.nib {
        NibShape::Square => {
            out.extend_from_slice(&[
                (cx - rx, cy - ry),
                (cx + rx, cy - ry),
                (cx + rx, cy + ry),
                (cx - rx, cy + ry),
            ]);
        }
        NibShape::Round => {
            let sides = ((std::f64::consts::TAU * rx.max(ry) / 2.0).ceil() as usize)
                .clamp(MIN_NIB_SIDES, MAX_NIB_SIDES);
            for i in 0..sides {
                let a = std::f64::consts::TAU * (i as f64) / (sides as f64);
                out.push((cx + rx * a.cos(), cy + ry * a.sin()));
            }
        }
    }
}

fn swept_nib(a: InkPoint, b: InkPoint, style: &InkStyle) -> Vec<(f64, f64)> {
    let mut pts = Vec::new();
    nib_footprint(a, style, &mut pts);
    nib_footprint(b, style, &mut pts);
    convex_hull(pts)
}

/// Andrew's monotone chain; result is counter-clockwise in a y-up frame.
fn convex_hull(mut pts: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    if pts.len() < 3 {
        return pts;
    }
    pts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    }

    let mut hull: Vec<(f64, f64)> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

fn push_hull(path: &mut BezPath, hull: &[(f64, f64)]) {
    if hull.len() < 3 {
        return;
    }
    path.move_to(hull[0]);
    for &p in &hull[1..] {
        path.line_to(p);
    }
    path.close_path();
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
