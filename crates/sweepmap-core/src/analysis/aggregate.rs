/// Category-level statistics built from categorised records.
use super::duplicates::DuplicateGroup;
use crate::model::{CategoryKind, FileRecord, SafetyLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key used in the extension breakdowns for files without an extension.
pub const NO_EXTENSION: &str = "(none)";

/// One semantic bucket and its statistics for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub kind: CategoryKind,
    pub safety: SafetyLevel,
    pub total_size: u64,
    pub item_count: u64,
    pub largest: Option<FileRecord>,
    /// Member with the earliest modification time.
    pub oldest: Option<FileRecord>,
    /// Integer mean of member sizes.
    pub average_size: u64,
    /// Extension → file count. Empty unless detailed analysis is on.
    pub extension_counts: BTreeMap<String, u64>,
    /// Extension → total bytes. Empty unless detailed analysis is on.
    pub extension_sizes: BTreeMap<String, u64>,
    /// Reclaimable bytes; only set for `Duplicates`.
    pub potential_savings: Option<u64>,
    /// Members, largest first, then by path.
    pub files: Vec<FileRecord>,
}

impl Category {
    fn new(kind: CategoryKind) -> Self {
        Self {
            kind,
            safety: kind.safety(),
            total_size: 0,
            item_count: 0,
            largest: None,
            oldest: None,
            average_size: 0,
            extension_counts: BTreeMap::new(),
            extension_sizes: BTreeMap::new(),
            potential_savings: None,
            files: Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    fn add(&mut self, record: FileRecord, detailed: bool) {
        self.total_size += record.size;
        self.item_count += 1;

        if detailed {
            let ext = record.extension().unwrap_or_else(|| NO_EXTENSION.to_string());
            *self.extension_sizes.entry(ext.clone()).or_default() += record.size;
            *self.extension_counts.entry(ext).or_default() += 1;
        }

        let bigger = match &self.largest {
            Some(cur) => (record.size, &cur.path) > (cur.size, &record.path),
            None => true,
        };
        if bigger {
            self.largest = Some(record.clone());
        }

        if let Some(modified) = record.modified {
            let older = match self.oldest.as_ref().and_then(|o| o.modified.map(|m| (m, o))) {
                Some((cur, o)) => (modified, &record.path) < (cur, &o.path),
                None => true,
            };
            if older {
                self.oldest = Some(record.clone());
            }
        }

        self.files.push(record);
    }

    fn finish(&mut self) {
        self.average_size = self.total_size.checked_div(self.item_count).unwrap_or(0);
        self.files
            .sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    }
}

/// Build per-category statistics from records that already carry their
/// category (`None` counts as `Other`).
///
/// Only non-empty categories are returned, sorted by descending total size
/// with ties in category declaration order.
pub fn aggregate(
    records: Vec<FileRecord>,
    groups: &[DuplicateGroup],
    detailed: bool,
) -> Vec<Category> {
    let mut buckets: BTreeMap<CategoryKind, Category> = BTreeMap::new();

    for record in records {
        let kind = record.category.unwrap_or(CategoryKind::Other);
        buckets
            .entry(kind)
            .or_insert_with(|| Category::new(kind))
            .add(record, detailed);
    }

    if let Some(duplicates) = buckets.get_mut(&CategoryKind::Duplicates) {
        duplicates.potential_savings = Some(groups.iter().map(DuplicateGroup::wasted_space).sum());
    }

    let mut categories: Vec<Category> = buckets.into_values().collect();
    for category in &mut categories {
        category.finish();
    }
    categories.sort_by(|a, b| {
        b.total_size
            .cmp(&a.total_size)
            .then_with(|| a.kind.cmp(&b.kind))
    });
    categories
}
