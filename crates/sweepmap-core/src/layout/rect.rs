use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A zero-area rectangle at `(x, y)`.
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Replace non-finite coordinates with zero and negative extents with
    /// zero, so later arithmetic can never produce NaN.
    pub fn sanitized(self) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            x: finite(self.x),
            y: finite(self.y),
            width: finite(self.width).max(0.0),
            height: finite(self.height).max(0.0),
        }
    }

    /// Shrink by `padding` on every side, then drop a `header` band from
    /// the top. Extents clamp at zero.
    pub fn content(self, padding: f64, header: f64) -> Self {
        let padding = padding.max(0.0);
        let header = header.max(0.0);
        let width = (self.width - 2.0 * padding).max(0.0);
        let height = (self.height - 2.0 * padding - header).max(0.0);
        Self {
            x: self.x + padding.min(self.width / 2.0),
            y: self.y + (padding + header).min(self.height),
            width,
            height,
        }
    }

    /// Shorter of the two sides.
    pub fn min_extent(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn contains_rect(&self, other: &Rect, tolerance: f64) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.x + other.width <= self.x + self.width + tolerance
            && other.y + other.height <= self.y + self.height + tolerance
    }
}
