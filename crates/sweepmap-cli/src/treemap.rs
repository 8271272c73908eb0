/// Character-cell rendering of a treemap layout.
///
/// Each top-level segment is painted with its own letter; segments too
/// small to cover a cell still appear in the legend.
use serde::Serialize;
use sweepmap_core::layout::{LayoutSegment, Rect};
use sweepmap_core::model::size::format_size;

const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const EMPTY: char = '.';

/// One legend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub glyph: char,
    pub label: String,
    pub size: u64,
    pub percent: f64,
    pub category: Option<&'static str>,
}

/// A rendered grid plus its legend.
#[derive(Debug, Clone, Serialize)]
pub struct AsciiTreemap {
    pub width: u16,
    pub height: u16,
    pub rows: Vec<String>,
    pub legend: Vec<LegendEntry>,
}

/// Bounds matching a `width` × `height` character grid.
pub fn grid_bounds(width: u16, height: u16) -> Rect {
    Rect::new(0.0, 0.0, f64::from(width), f64::from(height))
}

/// Paint the top-level `segments` (laid out in [`grid_bounds`]) into a
/// character grid. A cell takes the glyph of the segment covering its
/// centre.
pub fn render(segments: &[LayoutSegment], width: u16, height: u16) -> AsciiTreemap {
    let mut grid = vec![vec![EMPTY; usize::from(width)]; usize::from(height)];
    let mut legend = Vec::with_capacity(segments.len().min(GLYPHS.len()));

    for (segment, &glyph) in segments.iter().zip(GLYPHS) {
        let glyph = char::from(glyph);
        paint(&mut grid, &segment.rect, glyph);
        legend.push(LegendEntry {
            glyph,
            label: segment.label.clone(),
            size: segment.size,
            percent: segment.percent_of_parent,
            category: segment.category.map(|c| c.label()),
        });
    }

    AsciiTreemap {
        width,
        height,
        rows: grid.into_iter().map(|row| row.into_iter().collect()).collect(),
        legend,
    }
}

fn paint(grid: &mut [Vec<char>], rect: &Rect, glyph: char) {
    for (row, cells) in grid.iter_mut().enumerate() {
        let cy = row as f64 + 0.5;
        if cy < rect.y || cy >= rect.y + rect.height {
            continue;
        }
        for (col, cell) in cells.iter_mut().enumerate() {
            let cx = col as f64 + 0.5;
            if cx >= rect.x && cx < rect.x + rect.width {
                *cell = glyph;
            }
        }
    }
}

impl AsciiTreemap {
    /// Grid framed by a border, then the legend.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let border = format!("+{}+\n", "-".repeat(usize::from(self.width)));
        out.push_str(&border);
        for row in &self.rows {
            out.push('|');
            out.push_str(row);
            out.push_str("|\n");
        }
        out.push_str(&border);
        for entry in &self.legend {
            out.push_str(&format!(
                "  {}  {:<32} {:>10}  {:>5.1}%",
                entry.glyph,
                entry.label,
                format_size(entry.size),
                entry.percent
            ));
            if let Some(category) = entry.category {
                out.push_str(&format!("  [{category}]"));
            }
            out.push('\n');
        }
        out
    }
}
