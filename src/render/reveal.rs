use std::ops::Range;

/// Reveal window over the concatenated reveal points of all visible strokes.
///
/// Strokes are accounted bottom layer first; inside a layer, in insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RevealWindow {
    /// Signed index of the first revealed point, in `[-total, total)`.
    pub point_from: i64,
    /// Number of revealed points.
    pub point_length: i64,
}

impl RevealWindow {
    /// Compute the window from the total point count and percentage parameters.
    ///
    /// `offset_pct` wraps with period 200%; `length_pct` is a share of `total`.
    pub fn from_percentages(total: usize, offset_pct: f64, length_pct: f64) -> Self {
        let t = total as f64;
        let double_t = if total > 0 { t * 2.0 } else { 1.0 };
        let wrapped = ((t * (offset_pct + 100.0) / 100.0) % double_t + double_t) % double_t;
        let point_from = if wrapped.is_finite() {
            wrapped as i64 - total as i64
        } else {
            -(total as i64)
        };
        let length = (t * length_pct / 100.0).floor();
        let point_length = if length.is_finite() {
            (length as i64).max(0)
        } else {
            0
        };
        Self {
            point_from,
            point_length,
        }
    }

    /// Window revealing every point.
    pub fn full(total: usize) -> Self {
        Self {
            point_from: 0,
            point_length: total as i64,
        }
    }

    /// Start a cursor that walks strokes in reveal order.
    pub fn cursor(self) -> RevealCursor {
        RevealCursor {
            window: self,
            consumed: 0,
        }
    }
}

/// Running cursor slicing consecutive strokes against a [`RevealWindow`].
#[derive(Clone, Copy, Debug)]
pub struct RevealCursor {
    window: RevealWindow,
    consumed: i64,
}

impl RevealCursor {
    /// Advance past a stroke of `len` points, returning its revealed index range if non-empty.
    pub fn advance(&mut self, len: usize) -> Option<Range<usize>> {
        let len_i = len as i64;
        let from = self.window.point_from;
        let until = from.saturating_add(self.window.point_length);
        let consumed = self.consumed;
        self.consumed = consumed.saturating_add(len_i);

        // Entirely outside the window.
        if until <= consumed || from >= consumed.saturating_add(len_i) {
            return None;
        }

        let start = (from - consumed).max(0);
        let end = (until - consumed).min(len_i);
        if start >= end {
            return None;
        }
        Some(start as usize..end as usize)
    }

    /// Points consumed so far.
    pub fn consumed(&self) -> i64 {
        self.consumed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/reveal.rs"]
mod tests;
