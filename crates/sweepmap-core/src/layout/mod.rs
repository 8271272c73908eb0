/// Treemap layout engine.
///
/// Turns a sized hierarchy into nested, non-overlapping rectangles using
/// the squarified algorithm. The engine is pure geometry: it knows
/// nothing about colours, fonts or hit-testing, which stay with the
/// frontend.
pub mod rect;
pub mod squarify;

pub use rect::Rect;

use crate::config::LayoutOptions;
use crate::model::{CategoryKind, FileTree, NodeId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// Input to the layout engine: one sized item, optionally with children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedItem {
    pub label: String,
    pub path: PathBuf,
    pub size: u64,
    pub is_dir: bool,
    pub category: Option<CategoryKind>,
    pub children: Vec<SizedItem>,
}

impl SizedItem {
    pub fn leaf(label: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            size,
            is_dir: false,
            category: None,
            children: Vec::new(),
        }
    }

    /// A directory whose size is the sum of its children.
    pub fn dir(
        label: impl Into<String>,
        path: impl Into<PathBuf>,
        children: Vec<SizedItem>,
    ) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            size: children.iter().map(|c| c.size).sum(),
            is_dir: true,
            category: None,
            children,
        }
    }

    pub fn with_category(mut self, category: CategoryKind) -> Self {
        self.category = Some(category);
        self
    }

    /// The root's children as sized items, down to `max_depth` levels
    /// below the root (`None` = unlimited).
    pub fn from_tree(tree: &FileTree, max_depth: Option<usize>) -> Vec<SizedItem> {
        match tree.root {
            Some(root) => tree
                .children_by_size(root)
                .into_iter()
                .map(|idx| Self::from_node(tree, idx, 1, max_depth))
                .collect(),
            None => Vec::new(),
        }
    }

    fn from_node(tree: &FileTree, idx: NodeId, depth: usize, max_depth: Option<usize>) -> Self {
        let record = &tree.node(idx).record;
        let children = if record.is_dir && max_depth.map_or(true, |max| depth < max) {
            tree.children_by_size(idx)
                .into_iter()
                .map(|child| Self::from_node(tree, child, depth + 1, max_depth))
                .collect()
        } else {
            Vec::new()
        };
        Self {
            label: record.name.to_string(),
            path: record.path.clone(),
            size: record.size,
            is_dir: record.is_dir,
            category: record.category,
            children,
        }
    }
}

/// A positioned treemap rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSegment {
    pub label: String,
    pub path: PathBuf,
    pub size: u64,
    /// Share of the parent item's size, `0.0..=100.0`. Top-level segments
    /// are measured against the sum of all top-level items.
    pub percent_of_parent: f64,
    /// 0 for top-level segments.
    pub depth: usize,
    pub children: Vec<LayoutSegment>,
    pub category: Option<CategoryKind>,
    pub is_dir: bool,
    pub rect: Rect,
    /// `false` when either side is below the minimum visual extent. The
    /// rectangle is still valid and still occupies its share of the parent.
    pub visible: bool,
}

impl LayoutSegment {
    /// This segment and every descendant, depth first.
    pub fn descendants(&self) -> Vec<&LayoutSegment> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(seg) = stack.pop() {
            out.push(seg);
            stack.extend(seg.children.iter().rev());
        }
        out
    }
}

/// Lay out `items` inside `bounds`.
///
/// Siblings are ordered by size (descending), then label, then path, so
/// the same input always yields the same geometry. Each directory's
/// children are laid out inside its rectangle, less `options.padding` on
/// every side and `options.header_height` at the top.
pub fn layout_treemap(
    items: &[SizedItem],
    bounds: Rect,
    options: &LayoutOptions,
) -> Vec<LayoutSegment> {
    let parent_size: u64 = items.iter().map(|i| i.size).sum();
    layout_level(items, parent_size, bounds.sanitized(), 0, options)
}

fn layout_level(
    items: &[SizedItem],
    parent_size: u64,
    bounds: Rect,
    depth: usize,
    options: &LayoutOptions,
) -> Vec<LayoutSegment> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&SizedItem> = items.iter().collect();
    ordered.sort_by(|a, b| compare_items(a, b));

    let sizes: Vec<u64> = ordered.iter().map(|i| i.size).collect();
    let rects = squarify::squarify(&sizes, bounds, options.max_row_items);

    ordered
        .into_iter()
        .zip(rects)
        .map(|(item, rect)| {
            let descend = item.is_dir
                && !item.children.is_empty()
                && options.max_depth.map_or(true, |max| depth < max);
            let children = if descend {
                let inner = rect.content(options.padding, options.header_height);
                layout_level(&item.children, item.size, inner, depth + 1, options)
            } else {
                Vec::new()
            };

            LayoutSegment {
                label: item.label.clone(),
                path: item.path.clone(),
                size: item.size,
                percent_of_parent: percent(item.size, parent_size),
                depth,
                children,
                category: item.category,
                is_dir: item.is_dir,
                rect,
                visible: rect.min_extent() >= options.min_visible_extent,
            }
        })
        .collect()
}

fn compare_items(a: &SizedItem, b: &SizedItem) -> Ordering {
    b.size
        .cmp(&a.size)
        .then_with(|| a.label.cmp(&b.label))
        .then_with(|| a.path.cmp(&b.path))
}

fn percent(size: u64, parent: u64) -> f64 {
    if parent == 0 {
        0.0
    } else {
        (size as f64 / parent as f64 * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileRecord;
    use std::path::Path;

    fn opts() -> LayoutOptions {
        LayoutOptions::default()
    }

    fn leaf(label: &str, size: u64) -> SizedItem {
        SizedItem::leaf(label, format!("/r/{label}"), size)
    }

    #[test]
    fn widths_proportional_to_sizes() {
        let items = [leaf("a", 10), leaf("b", 20), leaf("c", 30)];
        let segs = layout_treemap(&items, Rect::new(0.0, 0.0, 60.0, 10.0), &opts());
        let labels: Vec<_> = segs.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["c", "b", "a"]);
        assert!((segs[0].rect.width - 30.0).abs() < 1e-9);
        assert!((segs[1].rect.width - 20.0).abs() < 1e-9);
        assert!((segs[2].rect.width - 10.0).abs() < 1e-9);
        assert!((segs[0].percent_of_parent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn children_conserve_parent_area() {
        let dir = SizedItem::dir(
            "d",
            "/r/d",
            vec![leaf("x", 5), leaf("y", 3), leaf("z", 2)],
        );
        let items = [dir, leaf("f", 10)];
        let segs = layout_treemap(&items, Rect::new(0.0, 0.0, 100.0, 50.0), &opts());
        let d = segs.iter().find(|s| s.label == "d").unwrap();
        let child_area: f64 = d.children.iter().map(|c| c.rect.area()).sum();
        assert!((child_area - d.rect.area()).abs() < 1e-6);
        assert!(d.children.iter().all(|c| c.depth == 1));
        assert!(d.children.iter().all(|c| d.rect.contains_rect(&c.rect, 1e-6)));
    }

    #[test]
    fn padding_and_header_shrink_child_area() {
        let dir = SizedItem::dir("d", "/r/d", vec![leaf("x", 1), leaf("y", 1)]);
        let options = LayoutOptions {
            padding: 1.0,
            header_height: 3.0,
            ..opts()
        };
        let segs = layout_treemap(&[dir], Rect::new(0.0, 0.0, 20.0, 20.0), &options);
        let inner = segs[0].rect.content(1.0, 3.0);
        let child_area: f64 = segs[0].children.iter().map(|c| c.rect.area()).sum();
        assert!((child_area - inner.area()).abs() < 1e-6);
        assert!((inner.area() - 18.0 * 15.0).abs() < 1e-9);
    }

    #[test]
    fn tiny_items_are_flagged_not_dropped() {
        let items = [leaf("big", 10_000), leaf("tiny", 1), leaf("zero", 0)];
        let segs = layout_treemap(&items, Rect::new(0.0, 0.0, 100.0, 100.0), &opts());
        assert_eq!(segs.len(), 3);
        assert!(segs[0].visible);
        assert!(!segs[1].visible);
        assert!(!segs[2].visible);
        assert_eq!(segs[2].rect.area(), 0.0);
        assert!(segs.iter().all(|s| s.rect.x.is_finite() && s.rect.width.is_finite()));
    }

    #[test]
    fn ties_sort_by_label_then_path() {
        let items = [
            SizedItem::leaf("b", "/2", 5),
            SizedItem::leaf("a", "/9", 5),
            SizedItem::leaf("a", "/1", 5),
        ];
        let segs = layout_treemap(&items, Rect::new(0.0, 0.0, 30.0, 10.0), &opts());
        let paths: Vec<_> = segs.iter().map(|s| s.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("/1"), PathBuf::from("/9"), PathBuf::from("/2")]);
        let again = layout_treemap(&items, Rect::new(0.0, 0.0, 30.0, 10.0), &opts());
        assert_eq!(segs, again);
    }

    #[test]
    fn max_depth_stops_recursion() {
        let inner = SizedItem::dir("inner", "/r/d/inner", vec![leaf("x", 1)]);
        let dir = SizedItem::dir("d", "/r/d", vec![inner]);
        let options = LayoutOptions {
            max_depth: Some(1),
            ..opts()
        };
        let segs = layout_treemap(&[dir], Rect::new(0.0, 0.0, 10.0, 10.0), &options);
        assert_eq!(segs[0].children.len(), 1);
        assert!(segs[0].children[0].children.is_empty());
        assert_eq!(segs[0].descendants().len(), 2);
    }

    #[test]
    fn items_from_tree() {
        let tree = FileTree::from_records(
            Path::new("/r"),
            vec![
                FileRecord::new_dir("/r"),
                FileRecord::new_dir("/r/d"),
                FileRecord::new_file("/r/d/a", 4),
                FileRecord::new_file("/r/b", 6),
            ],
        );
        let items = SizedItem::from_tree(&tree, None);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "b");
        assert_eq!(items[1].size, 4);
        assert_eq!(items[1].children.len(), 1);

        let shallow = SizedItem::from_tree(&tree, Some(1));
        assert!(shallow[1].children.is_empty());
    }
}
