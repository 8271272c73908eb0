/// Squarified row packing (Bruls, Huizing & van Wijk).
///
/// Items are consumed largest first. Each row grows greedily along the
/// shorter side of the remaining rectangle while its worst aspect ratio
/// does not get worse; the finished row is then cut off the remaining
/// rectangle and the process repeats.
use super::rect::Rect;

/// Running statistics for the row being built. Tracking the sum, min and
/// max lets the worst aspect ratio be evaluated in O(1) per candidate.
#[derive(Debug, Clone, Copy)]
struct RowStats {
    sum: f64,
    min: f64,
    max: f64,
}

impl RowStats {
    fn new(area: f64) -> Self {
        Self {
            sum: area,
            min: area,
            max: area,
        }
    }

    fn with(self, area: f64) -> Self {
        Self {
            sum: self.sum + area,
            min: self.min.min(area),
            max: self.max.max(area),
        }
    }

    /// Worst aspect ratio of the row laid along a side of length `side`:
    /// `max(side² · max / sum², sum² / (side² · min))`.
    fn worst_ratio(&self, side: f64) -> f64 {
        if side <= 0.0 || self.sum <= 0.0 || self.min <= 0.0 {
            return f64::MAX;
        }
        let side_sq = side * side;
        let sum_sq = self.sum * self.sum;
        (side_sq * self.max / sum_sq).max(sum_sq / (side_sq * self.min))
    }
}

/// Lay out `sizes` inside `bounds`, returning one rectangle per size in
/// input order. `sizes` must already be sorted largest first.
///
/// Rectangle areas are proportional to sizes and together tile `bounds`.
/// Zero sizes (and every item when the total or the bounds are empty)
/// receive zero-area rectangles. `max_row_items` caps the row length.
pub fn squarify(sizes: &[u64], bounds: Rect, max_row_items: usize) -> Vec<Rect> {
    let bounds = bounds.sanitized();
    let total: f64 = sizes.iter().map(|&s| s as f64).sum();
    let mut rects = vec![Rect::point(bounds.x, bounds.y); sizes.len()];
    if total <= 0.0 || bounds.area() <= 0.0 {
        return rects;
    }

    let scale = bounds.area() / total;
    let areas: Vec<f64> = sizes.iter().map(|&s| s as f64 * scale).collect();
    // Sorted descending, so every zero size sits at the tail.
    let count = areas.iter().take_while(|&&a| a > 0.0).count();
    let max_row_items = max_row_items.max(1);

    let mut remaining = bounds;
    let mut remaining_area: f64 = areas[..count].iter().sum();
    let mut idx = 0;

    while idx < count {
        let layout_vertical = remaining.width >= remaining.height;
        let side = if layout_vertical {
            remaining.height
        } else {
            remaining.width
        };

        // Greedy row building.
        let start = idx;
        let mut row = RowStats::new(areas[idx]);
        let mut best_worst = row.worst_ratio(side);
        idx += 1;
        while idx < count && idx - start < max_row_items {
            let trial = row.with(areas[idx]);
            let ratio = trial.worst_ratio(side);
            if ratio <= best_worst {
                row = trial;
                best_worst = ratio;
                idx += 1;
            } else {
                break;
            }
        }

        // The last row takes whatever is left so float error never leaves a gap.
        let row_fraction = if idx == count || remaining_area <= 0.0 {
            1.0
        } else {
            (row.sum / remaining_area).clamp(0.0, 1.0)
        };
        remaining_area -= row.sum;

        let row_rect = if layout_vertical {
            let row_w = remaining.width * row_fraction;
            let row_rect = Rect::new(remaining.x, remaining.y, row_w, remaining.height);
            remaining = Rect::new(
                remaining.x + row_w,
                remaining.y,
                (remaining.width - row_w).max(0.0),
                remaining.height,
            );
            row_rect
        } else {
            let row_h = remaining.height * row_fraction;
            let row_rect = Rect::new(remaining.x, remaining.y, remaining.width, row_h);
            remaining = Rect::new(
                remaining.x,
                remaining.y + row_h,
                remaining.width,
                (remaining.height - row_h).max(0.0),
            );
            row_rect
        };

        // Place items in the row; the last one absorbs the remainder.
        let mut offset = 0.0;
        for i in start..idx {
            let last = i + 1 == idx;
            let fraction = if row.sum > 0.0 { areas[i] / row.sum } else { 0.0 };
            rects[i] = if layout_vertical {
                let item_h = if last {
                    (row_rect.height - offset).max(0.0)
                } else {
                    row_rect.height * fraction
                };
                let r = Rect::new(row_rect.x, row_rect.y + offset, row_rect.width, item_h);
                offset += item_h;
                r
            } else {
                let item_w = if last {
                    (row_rect.width - offset).max(0.0)
                } else {
                    row_rect.width * fraction
                };
                let r = Rect::new(row_rect.x + offset, row_rect.y, item_w, row_rect.height);
                offset += item_w;
                r
            };
        }
    }

    for rect in &mut rects[count..] {
        *rect = Rect::point(remaining.x, remaining.y);
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn three_items_in_a_strip() {
        let rects = squarify(&[30, 20, 10], Rect::new(0.0, 0.0, 60.0, 10.0), 512);
        let widths: Vec<f64> = rects.iter().map(|r| r.width).collect();
        assert!((widths[0] - 30.0).abs() < EPS);
        assert!((widths[1] - 20.0).abs() < EPS);
        assert!((widths[2] - 10.0).abs() < EPS);
        assert!((widths.iter().sum::<f64>() - 60.0).abs() < EPS);
        assert!(rects.iter().all(|r| (r.height - 10.0).abs() < EPS));
    }

    #[test]
    fn areas_tile_the_bounds() {
        let sizes = [500, 433, 200, 150, 90, 60, 7, 3, 1];
        let bounds = Rect::new(5.0, 7.0, 123.0, 77.0);
        let rects = squarify(&sizes, bounds, 512);
        let total: f64 = rects.iter().map(Rect::area).sum();
        assert!((total - bounds.area()).abs() < 1e-6 * bounds.area());
        for (r, &s) in rects.iter().zip(&sizes) {
            let expected = s as f64 / 1444.0 * bounds.area();
            assert!((r.area() - expected).abs() < 1e-6 * bounds.area());
            assert!(bounds.contains_rect(r, 1e-6));
        }
    }

    #[test]
    fn zero_sizes_and_empty_bounds_never_produce_nan() {
        let rects = squarify(&[10, 0, 0], Rect::new(0.0, 0.0, 10.0, 10.0), 512);
        assert!((rects[0].area() - 100.0).abs() < EPS);
        assert_eq!(rects[1].area(), 0.0);
        assert_eq!(rects[2].area(), 0.0);

        let rects = squarify(&[0, 0], Rect::new(0.0, 0.0, 10.0, 10.0), 512);
        assert!(rects.iter().all(|r| r.area() == 0.0));

        let rects = squarify(&[5, 4], Rect::new(0.0, 0.0, f64::NAN, 10.0), 512);
        assert!(rects
            .iter()
            .all(|r| r.area() == 0.0 && r.x.is_finite() && r.y.is_finite()));
    }

    #[test]
    fn row_cap_limits_items_per_row() {
        // Equal items in a square would pack several per row; a cap of one
        // forces one item per row.
        let rects = squarify(&[1, 1, 1, 1], Rect::new(0.0, 0.0, 4.0, 4.0), 1);
        let total: f64 = rects.iter().map(Rect::area).sum();
        assert!((total - 16.0).abs() < EPS);
        assert!(rects.iter().all(|r| (r.area() - 4.0).abs() < EPS));
    }

    #[test]
    fn deterministic() {
        let sizes = [9, 8, 7, 6, 5, 4, 3, 2, 1];
        let bounds = Rect::new(0.0, 0.0, 40.0, 30.0);
        assert_eq!(squarify(&sizes, bounds, 512), squarify(&sizes, bounds, 512));
    }
}
