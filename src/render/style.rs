use crate::foundation::core::ColorF;
use crate::foundation::error::{InkError, InkResult};
use crate::model::stroke::{DrawingAttributes, StylusTip};

/// Nib outline used when sweeping ink geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NibShape {
    /// Ellipse.
    Round,
    /// Axis-aligned rectangle.
    Square,
}

/// Cache key for ink styles: tip shape and nib dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StyleKey {
    tip: StylusTip,
    width_bits: u64,
    height_bits: u64,
}

impl StyleKey {
    /// Extract the style-relevant part of a stroke's attributes.
    pub fn from_attributes(attrs: &DrawingAttributes) -> Self {
        Self {
            tip: attrs.tip,
            width_bits: attrs.width.to_bits(),
            height_bits: attrs.height.to_bits(),
        }
    }

    fn width(self) -> f64 {
        f64::from_bits(self.width_bits)
    }

    fn height(self) -> f64 {
        f64::from_bits(self.height_bits)
    }
}

/// Ink style resource: nib shape plus vertical/horizontal aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InkStyle {
    /// Nib outline.
    pub nib: NibShape,
    /// `height / width` of the nib.
    pub aspect: f64,
}

impl InkStyle {
    /// Construct the style for `key`.
    pub fn build(key: &StyleKey) -> InkResult<Self> {
        let (w, h) = (key.width(), key.height());
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(InkError::resource(format!(
                "ink style needs positive nib dimensions, got {w}x{h}"
            )));
        }
        Ok(Self {
            nib: match key.tip {
                StylusTip::Round => NibShape::Round,
                StylusTip::Square => NibShape::Square,
            },
            aspect: h / w,
        })
    }
}

/// Solid color brush resource.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolidBrush {
    /// Straight color with the layer opacity already folded into alpha.
    pub color: ColorF,
}

impl SolidBrush {
    /// Construct a brush; colors must be finite.
    pub fn build(color: &ColorF) -> InkResult<Self> {
        if !color.is_finite() {
            return Err(InkError::resource("brush color must be finite"));
        }
        Ok(Self { color: *color })
    }
}

/// Resolve the brush color for a stroke on a layer.
///
/// Highlighter strokes draw at half their alpha; every stroke's alpha is multiplied by the layer
/// opacity.
pub fn resolve_color(attrs: &DrawingAttributes, layer_opacity: f64) -> ColorF {
    let base = ColorF::from_rgba8(attrs.color);
    let opacity = layer_opacity as f32;
    if attrs.highlighter {
        base.with_alpha(base.a / 2.0 * opacity)
    } else {
        base.with_alpha(base.a * opacity)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/style.rs"]
mod tests;
