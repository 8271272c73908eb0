/// Assigns every file exactly one category and aggregates the result.
use super::aggregate::{aggregate, Category};
use super::duplicates::DuplicateGroup;
use super::rules::{classify, RuleContext};
use crate::config::CategorizeOptions;
use crate::model::{CategoryKind, FileRecord};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Return a copy of every non-directory record with its category set.
///
/// Members of a duplicate group go to `Duplicates` without consulting the
/// rules; everything else takes the first matching rule. Output keeps the
/// input order.
pub fn assign_categories(
    records: &[FileRecord],
    groups: &[DuplicateGroup],
    options: &CategorizeOptions,
) -> Vec<FileRecord> {
    let ctx = RuleContext::from_options(options);
    let duplicate_paths: HashSet<&Path> = groups
        .iter()
        .flat_map(|g| g.members.iter().map(|m| m.path.as_path()))
        .collect();

    records
        .par_iter()
        .filter(|r| !r.is_dir)
        .map(|record| {
            let kind = if duplicate_paths.contains(record.path.as_path()) {
                CategoryKind::Duplicates
            } else {
                classify(record, &ctx)
            };
            record.clone().with_category(kind)
        })
        .collect()
}

/// Categorise `records` and compute per-category statistics.
///
/// Directory records are ignored; every other record lands in exactly one
/// category. The result depends only on the inputs (with
/// `options.reference_time` pinned), so repeated calls agree.
pub fn categorize(
    records: &[FileRecord],
    groups: &[DuplicateGroup],
    options: &CategorizeOptions,
) -> Vec<Category> {
    let tagged = assign_categories(records, groups, options);
    debug!("Categorised {} files", tagged.len());
    aggregate(tagged, groups, options.detailed_analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn options() -> CategorizeOptions {
        CategorizeOptions {
            reference_time: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1 << 30)),
            ..CategorizeOptions::default()
        }
    }

    fn sample() -> Vec<FileRecord> {
        vec![
            FileRecord::new_dir("/home/me"),
            FileRecord::new_file("/home/me/report.pdf", 400),
            FileRecord::new_file("/home/me/web/node_modules/x/index.js", 30),
            FileRecord::new_file("/home/me/a.iso", 2_000),
            FileRecord::new_file("/home/me/b.iso", 2_000),
            FileRecord::new_file("/home/me/notes", 1),
        ]
    }

    fn dup_group() -> DuplicateGroup {
        DuplicateGroup {
            hash: "ff".into(),
            size: 2_000,
            members: vec![
                FileRecord::new_file("/home/me/a.iso", 2_000),
                FileRecord::new_file("/home/me/b.iso", 2_000),
            ],
        }
    }

    #[test]
    fn partitions_non_directory_records() {
        let records = sample();
        let cats = categorize(&records, &[dup_group()], &options());

        let total_items: u64 = cats.iter().map(|c| c.item_count).sum();
        assert_eq!(total_items, 5);
        let mut seen: Vec<_> = cats
            .iter()
            .flat_map(|c| c.files.iter().map(|f| f.path.clone()))
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn duplicates_bypass_rules() {
        let cats = categorize(&sample(), &[dup_group()], &options());
        let dups = cats
            .iter()
            .find(|c| c.kind == CategoryKind::Duplicates)
            .unwrap();
        assert_eq!(dups.item_count, 2);
        assert_eq!(dups.potential_savings, Some(2_000));
        assert!(!cats.iter().any(|c| c.kind == CategoryKind::Archives));
    }

    #[test]
    fn spot_checks() {
        let tagged = assign_categories(&sample(), &[], &options());
        let kind_of = |name: &str| {
            tagged
                .iter()
                .find(|r| r.path.ends_with(name))
                .and_then(|r| r.category)
        };
        assert_eq!(kind_of("report.pdf"), Some(CategoryKind::Documents));
        assert_eq!(kind_of("index.js"), Some(CategoryKind::Developer));
        assert_eq!(kind_of("a.iso"), Some(CategoryKind::Archives));
        assert_eq!(kind_of("notes"), Some(CategoryKind::Other));
    }

    #[test]
    fn idempotent() {
        let records = sample();
        let groups = [dup_group()];
        let first = categorize(&records, &groups, &options());
        let second = categorize(&records, &groups, &options());
        assert_eq!(first, second);
    }
}
