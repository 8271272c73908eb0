/// End-to-end analysis of one scan snapshot.
///
/// Rule-based categorisation and duplicate detection read the same
/// immutable records, so they run side by side via `rayon::join`; the
/// duplicate groups are folded in afterwards, before aggregation.
use crate::analysis::{aggregate, assign_categories, Category, DuplicateDetector, DuplicateReport};
use crate::cancel::CancellationToken;
use crate::config::Settings;
use crate::error::DetectionError;
use crate::layout::SizedItem;
use crate::model::{CategoryKind, FileRecord, FileTree};
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Everything derived from one snapshot.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Every non-directory record with its category set.
    pub files: Vec<FileRecord>,
    /// Non-empty categories, largest first.
    pub categories: Vec<Category>,
    pub duplicates: DuplicateReport,
    pub duration: Duration,
}

impl Analysis {
    pub fn total_size(&self) -> u64 {
        self.categories.iter().map(|c| c.total_size).sum()
    }

    pub fn category(&self, kind: CategoryKind) -> Option<&Category> {
        self.categories.iter().find(|c| c.kind == kind)
    }

    /// Treemap input for the scanned hierarchy, with each file carrying
    /// its category. `scanned` supplies the directory records.
    pub fn sized_items(
        &self,
        root: &Path,
        scanned: &[FileRecord],
        max_depth: Option<usize>,
    ) -> Vec<SizedItem> {
        let dirs = scanned.iter().filter(|r| r.is_dir).cloned();
        let tree = FileTree::from_records(root, dirs.chain(self.files.iter().cloned()));
        SizedItem::from_tree(&tree, max_depth)
    }
}

/// Categorise `records` and find duplicates among them.
///
/// Cancellation only affects duplicate detection (categorisation is pure
/// CPU work over data already in memory); a cancelled run returns
/// [`DetectionError::Cancelled`] and nothing else.
pub fn analyse(
    records: &[FileRecord],
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<Analysis, DetectionError> {
    let start = Instant::now();
    let detector = DuplicateDetector::new(settings.duplicates.clone());

    let (mut files, duplicates) = rayon::join(
        || assign_categories(records, &[], &settings.categorize),
        || detector.detect(records, cancel),
    );
    let duplicates = duplicates?;

    let duplicate_paths: HashSet<&Path> = duplicates
        .groups
        .iter()
        .flat_map(|g| g.members.iter().map(|m| m.path.as_path()))
        .collect();
    for file in &mut files {
        if duplicate_paths.contains(file.path.as_path()) {
            file.category = Some(CategoryKind::Duplicates);
        }
    }

    let categories = aggregate(
        files.clone(),
        &duplicates.groups,
        settings.categorize.detailed_analysis,
    );
    let duration = start.elapsed();
    info!(
        "Analysis complete: {} files in {} categories, {} duplicate groups in {duration:?}",
        files.len(),
        categories.len(),
        duplicates.groups.len()
    );

    Ok(Analysis {
        files,
        categories,
        duplicates,
        duration,
    })
}
