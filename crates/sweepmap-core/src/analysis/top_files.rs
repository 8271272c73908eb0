/// Top-N largest files analysis.
use crate::model::FileRecord;

/// The `n` largest non-directory records, largest first; equal sizes by
/// path.
///
/// Uses a partial select before sorting, so only the top `n` are fully
/// ordered: O(len + n log n).
pub fn largest_files(records: &[FileRecord], n: usize) -> Vec<&FileRecord> {
    if n == 0 {
        return Vec::new();
    }

    let mut files: Vec<&FileRecord> = records.iter().filter(|r| !r.is_dir).collect();
    let order = |a: &&FileRecord, b: &&FileRecord| {
        b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path))
    };

    if files.len() > n {
        files.select_nth_unstable_by(n - 1, order);
        files.truncate(n);
    }
    files.sort_unstable_by(order);
    files
}
