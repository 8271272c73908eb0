/// Directory hierarchy rebuilt from a flat record snapshot.
///
/// Nodes are stored in one `Vec` and refer to each other by [`NodeId`].
/// A node is always pushed after its parent, which is what lets
/// [`FileTree::aggregate_sizes`] run as a single reverse sweep.
use super::file_record::FileRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Position of a node in [`FileTree::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn from_position(position: usize) -> Self {
        debug_assert!(position <= u32::MAX as usize, "tree exceeds u32 nodes");
        Self(position as u32)
    }

    #[inline]
    pub fn position(self) -> usize {
        self.0 as usize
    }
}

/// One record and its links. Siblings are chained through `next_sibling`.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub record: FileRecord,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct FileTree {
    pub nodes: Vec<FileNode>,
    pub root: Option<NodeId>,
    /// Aggregated size of the root, 0 when empty.
    pub total_size: u64,
}

/// Walks a sibling chain.
pub struct Children<'a> {
    tree: &'a FileTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).next_sibling;
        Some(current)
    }
}

impl FileTree {
    /// Assemble a tree rooted at `root` from records in any order.
    ///
    /// Records are sorted by path first. `Path` ordering is component-wise,
    /// so a directory always sorts before anything inside it. Records
    /// outside `root` are dropped, missing intermediate directories are
    /// synthesised, and directory sizes are recomputed from their contents.
    pub fn from_records(root: &Path, records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut records: Vec<FileRecord> = records.into_iter().collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));

        let mut tree = Self {
            nodes: Vec::with_capacity(records.len() + 1),
            ..Self::default()
        };
        let mut dirs: HashMap<PathBuf, NodeId> = HashMap::new();

        let mut rest = records.into_iter().peekable();
        let root_record = rest
            .next_if(|first| first.path == root)
            .unwrap_or_else(|| FileRecord::new_dir(root));
        let root_id = tree.push(root_record, None);
        tree.root = Some(root_id);
        dirs.insert(root.to_path_buf(), root_id);

        let mut outside = 0usize;
        for record in rest {
            if record.path == root || !record.path.starts_with(root) {
                outside += 1;
                continue;
            }
            let Some(parent_path) = record.path.parent() else {
                continue;
            };
            let parent = match dirs.get(parent_path) {
                Some(&id) => id,
                None => tree.synthesise_dirs(&mut dirs, parent_path.to_path_buf(), root_id),
            };

            let dir_path = record.is_dir.then(|| record.path.clone());
            let id = tree.push(record, Some(parent));
            if let Some(path) = dir_path {
                dirs.insert(path, id);
            }
        }

        if outside > 0 {
            debug!("{outside} records outside {} were ignored", root.display());
        }

        tree.aggregate_sizes();
        tree
    }

    /// Append a node and link it as the newest child of `parent`.
    fn push(&mut self, record: FileRecord, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::from_position(self.nodes.len());
        let next_sibling = parent.and_then(|p| self.nodes[p.position()].first_child);
        self.nodes.push(FileNode {
            record,
            parent,
            first_child: None,
            next_sibling,
        });
        if let Some(p) = parent {
            self.nodes[p.position()].first_child = Some(id);
        }
        id
    }

    /// Create placeholder directories from the nearest known ancestor of
    /// `dir` down to `dir` itself, returning the id of `dir`.
    fn synthesise_dirs(
        &mut self,
        dirs: &mut HashMap<PathBuf, NodeId>,
        dir: PathBuf,
        root_id: NodeId,
    ) -> NodeId {
        let mut chain = vec![dir];
        let mut anchor = root_id;
        while let Some(parent) = chain.last().and_then(|p| p.parent()).map(Path::to_path_buf) {
            if let Some(&id) = dirs.get(&parent) {
                anchor = id;
                break;
            }
            chain.push(parent);
        }

        for path in chain.into_iter().rev() {
            anchor = self.push(FileRecord::new_dir(&path), Some(anchor));
            dirs.insert(path, anchor);
        }
        anchor
    }

    /// Recompute every directory's size from its descendants. Idempotent.
    pub fn aggregate_sizes(&mut self) {
        for node in &mut self.nodes {
            if node.record.is_dir {
                node.record.size = 0;
            }
        }

        for position in (1..self.nodes.len()).rev() {
            let node = &self.nodes[position];
            let Some(parent) = node.parent else {
                continue;
            };
            let size = node.record.size;
            self.nodes[parent.position()].record.size += size;
        }

        self.total_size = self
            .root
            .map_or(0, |root| self.nodes[root.position()].record.size);
    }

    /// Direct children in sibling-chain order.
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.node(parent).first_child,
        }
    }

    /// Direct children, largest first; equal sizes by name.
    pub fn children_by_size(&self, parent: NodeId) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.children(parent).collect();
        ids.sort_by(|&a, &b| {
            let (a, b) = (&self.node(a).record, &self.node(b).record);
            b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name))
        });
        ids
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &FileNode {
        &self.nodes[id.position()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Records in parent-before-child order, directories carrying their
    /// aggregated sizes.
    pub fn into_records(self) -> Vec<FileRecord> {
        self.nodes.into_iter().map(|n| n.record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<FileRecord> {
        vec![
            FileRecord::new_file("/r/Users/b.txt", 200),
            FileRecord::new_dir("/r/Users"),
            FileRecord::new_file("/r/Users/a.txt", 100),
            FileRecord::new_dir("/r"),
            FileRecord::new_bundle("/r/Tool.app", 50),
        ]
    }

    #[test]
    fn aggregation_sums_descendants() {
        let tree = FileTree::from_records(Path::new("/r"), sample());
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).record.size, 350);
        assert_eq!(tree.total_size, 350);

        let users = tree
            .children(root)
            .find(|&c| tree.node(c).record.name == "Users")
            .unwrap();
        assert_eq!(tree.node(users).record.size, 300);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let mut tree = FileTree::from_records(Path::new("/r"), sample());
        tree.aggregate_sizes();
        assert_eq!(tree.total_size, 350);
    }

    #[test]
    fn missing_ancestors_are_synthesised() {
        let records = vec![FileRecord::new_file("/r/a/b/c.bin", 7)];
        let tree = FileTree::from_records(Path::new("/r"), records);
        // root, a, b, c.bin
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.total_size, 7);
        let a = tree.children(tree.root.unwrap()).next().unwrap();
        assert_eq!(tree.node(a).record.size, 7);
    }

    #[test]
    fn records_outside_root_are_ignored() {
        let records = vec![
            FileRecord::new_file("/r/in.bin", 1),
            FileRecord::new_file("/elsewhere/out.bin", 1_000),
        ];
        let tree = FileTree::from_records(Path::new("/r"), records);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.total_size, 1);
    }

    #[test]
    fn children_ordered_largest_first_then_by_name() {
        let records = vec![
            FileRecord::new_file("/r/small.txt", 10),
            FileRecord::new_file("/r/b.bin", 1000),
            FileRecord::new_file("/r/a.bin", 1000),
        ];
        let tree = FileTree::from_records(Path::new("/r"), records);
        let names: Vec<_> = tree
            .children_by_size(tree.root.unwrap())
            .into_iter()
            .map(|c| tree.node(c).record.name.to_string())
            .collect();
        assert_eq!(names, ["a.bin", "b.bin", "small.txt"]);
    }

    #[test]
    fn into_records_keeps_parent_first_order() {
        let records = FileTree::from_records(Path::new("/r"), sample()).into_records();
        assert_eq!(records[0].path, PathBuf::from("/r"));
        assert_eq!(records[0].size, 350);
        assert_eq!(records.len(), 5);
    }
}
