/// Parallel two-pass directory walk using `jwalk`.
///
/// `jwalk` reads directories on a rayon pool while this thread consumes
/// entries in order. Filtering happens inside `process_read_dir`, on the
/// worker threads, so excluded, protected and bundle directories are
/// never read at all: their children are dropped before they are queued.
///
/// Pass 1 ([`count_pass`]) only counts eligible files to establish the
/// progress denominator. Pass 2 ([`emit_pass`]) stats every entry and
/// builds the records.
use crate::error::ScanError;
use crate::model::FileRecord;
use crate::scanner::filter::{EntryFilter, Verdict};
use crate::scanner::progress::{ProgressThrottle, ScanProgress};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Knobs shared by both passes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WalkSettings {
    pub progress_interval: Duration,
    pub yield_every: usize,
}

/// Everything pass 2 produced.
#[derive(Debug, Default)]
pub(crate) struct WalkResult {
    pub records: Vec<FileRecord>,
    pub skipped: Vec<ScanError>,
    pub files: u64,
    pub bytes: u64,
}

fn build_walker(root: &Path, filter: Arc<EntryFilter>) -> jwalk::WalkDir {
    jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(jwalk::Parallelism::RayonNewPool(num_cpus::get()))
        .process_read_dir(move |depth, _dir, _state, children| {
            // Stop queueing new reads as soon as cancellation is requested.
            if filter.cancel.is_cancelled() {
                children.clear();
                return;
            }
            // `None` is the root entry itself, validated before the walk.
            if depth.is_none() {
                return;
            }
            children.retain_mut(|child| match child {
                Ok(entry) => {
                    let path = entry.path();
                    match filter.verdict(&path, entry.file_type().is_dir()) {
                        Verdict::Keep => true,
                        Verdict::Bundle => {
                            entry.read_children_path = None;
                            true
                        }
                        Verdict::Prune => false,
                    }
                }
                Err(_) => true,
            });
        })
}

#[inline]
fn maybe_yield(seen: usize, every: usize) {
    if every > 0 && seen > 0 && seen % every == 0 {
        std::thread::yield_now();
    }
}

/// Pass 1: count files and bundles that pass 2 will emit.
pub(crate) fn count_pass(
    root: &Path,
    filter: Arc<EntryFilter>,
    settings: WalkSettings,
    progress: &mut dyn FnMut(ScanProgress),
) -> Result<u64, ScanError> {
    let mut throttle = ProgressThrottle::new(settings.progress_interval);
    let mut counted = 0u64;

    for (seen, entry) in build_walker(root, filter.clone()).into_iter().enumerate() {
        if filter.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        maybe_yield(seen, settings.yield_every);

        let Ok(entry) = entry else { continue };
        if entry.depth == 0 || entry.read_children_error.is_some() {
            continue;
        }
        if !entry.file_type().is_dir() || filter.probe().is_bundle(&entry.path()) {
            counted += 1;
            if throttle.ready() {
                progress(ScanProgress::Counting {
                    files_counted: counted,
                });
            }
        }
    }

    Ok(counted)
}

/// Pass 2: stat every surviving entry and build its record.
///
/// Entries whose listing or metadata read fails are reported through
/// `progress` as `Skipped`, collected as `EnumerationFailed`, and left
/// out of the result together with their subtree.
pub(crate) fn emit_pass(
    root: &Path,
    filter: Arc<EntryFilter>,
    settings: WalkSettings,
    files_total: u64,
    progress: &mut dyn FnMut(ScanProgress),
) -> Result<WalkResult, ScanError> {
    let mut throttle = ProgressThrottle::new(settings.progress_interval);
    let mut result = WalkResult {
        records: Vec::with_capacity(files_total as usize + 1_024),
        ..WalkResult::default()
    };
    let mut unreadable_dirs: HashSet<PathBuf> = HashSet::new();

    for (seen, entry_result) in build_walker(root, filter.clone()).into_iter().enumerate() {
        if filter.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        maybe_yield(seen, settings.yield_every);

        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                // jwalk errors are typically a directory that could not be listed.
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                unreadable_dirs.insert(path.clone());
                skip(&mut result, progress, path, err.to_string());
                continue;
            }
        };
        if entry.depth == 0 {
            continue;
        }

        let path = entry.path();
        // A directory jwalk could not list arrives as `Ok` with the error attached.
        if let Some(err) = &entry.read_children_error {
            unreadable_dirs.insert(path.clone());
            skip(&mut result, progress, path, err.to_string());
            continue;
        }
        let is_dir = entry.file_type().is_dir();
        let record = if is_dir && filter.probe().is_bundle(&path) {
            std::fs::symlink_metadata(&path).and_then(|meta| {
                let size = filter.probe().bundle_size(&path)?;
                let mut record = FileRecord::new_bundle(&path, size);
                record.modified = meta.modified().ok();
                record.created = meta.created().ok();
                Ok(record)
            })
        } else {
            std::fs::symlink_metadata(&path).map(|meta| FileRecord::from_metadata(&path, &meta))
        };

        match record {
            Ok(record) => {
                if !record.is_dir {
                    result.files += 1;
                    result.bytes += record.size;
                }
                result.records.push(record);
            }
            Err(err) => {
                if is_dir {
                    unreadable_dirs.insert(path.clone());
                }
                skip(&mut result, progress, path.clone(), err.to_string());
            }
        }

        if throttle.ready() {
            progress(ScanProgress::Update {
                files_scanned: result.files,
                files_total,
                bytes_scanned: result.bytes,
                current_path: path.to_string_lossy().into_owned(),
            });
        }
    }

    if !unreadable_dirs.is_empty() {
        result
            .records
            .retain(|r| !(r.is_dir && unreadable_dirs.contains(&r.path)));
    }

    Ok(result)
}

fn skip(
    result: &mut WalkResult,
    progress: &mut dyn FnMut(ScanProgress),
    path: PathBuf,
    cause: String,
) {
    debug!("Skipping {}: {cause}", path.display());
    progress(ScanProgress::Skipped {
        path: path.clone(),
        message: cause.clone(),
    });
    result.skipped.push(ScanError::EnumerationFailed { path, cause });
}
