/// Per-entry filtering applied by both scan passes before recursing.
use crate::cancel::CancellationToken;
use crate::platform::FsProbe;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Absolute form of `path` against the current directory, with `.`
/// components and trailing separators removed. Symlinks are not resolved.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    Ok(absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

/// User exclusions, normalised to absolute, trailing-separator-free paths.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    paths: Vec<PathBuf>,
}

impl ExclusionSet {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths = paths
            .into_iter()
            .filter_map(|p| normalize(p.as_ref()))
            .collect();
        Self { paths }
    }

    /// Exact match, or `path` lies underneath an excluded directory.
    /// Matching is per component: excluding `/data` leaves `/database`.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| path.starts_with(p))
    }
}

fn normalize(path: &Path) -> Option<PathBuf> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return None;
    }
    let trimmed = text.trim_end_matches(['/', '\\']);
    // A bare "/" trims to nothing; keep the filesystem root itself.
    let kept = if trimmed.is_empty() { &text[..1] } else { trimmed };
    absolutize(Path::new(kept)).ok()
}

/// What to do with a visited entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Emit it and, if a directory, descend.
    Keep,
    /// Emit it as one bundle record; never descend.
    Bundle,
    /// Drop it and its whole subtree.
    Prune,
}

/// Shared by the walker's worker threads (inside `process_read_dir`) and
/// the consuming loop.
pub(crate) struct EntryFilter {
    exclusions: ExclusionSet,
    skipped_roots: Vec<PathBuf>,
    probe: Arc<dyn FsProbe>,
    pub(crate) cancel: CancellationToken,
    pruned: AtomicU64,
}

impl EntryFilter {
    pub(crate) fn new(
        exclusions: ExclusionSet,
        skipped_roots: Vec<PathBuf>,
        probe: Arc<dyn FsProbe>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            exclusions,
            skipped_roots,
            probe,
            cancel,
            pruned: AtomicU64::new(0),
        }
    }

    /// Rules, in order: exclusions, protected paths, skipped mount roots,
    /// then bundle detection for directories.
    pub(crate) fn verdict(&self, path: &Path, is_dir: bool) -> Verdict {
        let prune = self.exclusions.is_excluded(path)
            || self.probe.is_protected(path, is_dir)
            || (is_dir && self.skipped_roots.iter().any(|r| path == r.as_path()));
        if prune {
            self.pruned.fetch_add(1, Ordering::Relaxed);
            return Verdict::Prune;
        }
        if is_dir && self.probe.is_bundle(path) {
            Verdict::Bundle
        } else {
            Verdict::Keep
        }
    }

    /// Entries dropped by exclusion, protection, or mount-root rules.
    pub(crate) fn pruned_count(&self) -> u64 {
        self.pruned.load(Ordering::Relaxed)
    }

    pub(crate) fn probe(&self) -> &dyn FsProbe {
        self.probe.as_ref()
    }

    /// Checked on the root before any traversal.
    pub(crate) fn rejects_root(&self, root: &Path) -> bool {
        self.exclusions.is_excluded(root) || self.probe.is_protected(root, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::VolumeKind;
    use std::io;

    struct NoProbe;

    impl FsProbe for NoProbe {
        fn is_protected(&self, path: &Path, _is_dir: bool) -> bool {
            path.starts_with("/locked")
        }
        fn is_bundle(&self, path: &Path) -> bool {
            path.extension().map(|e| e == "app").unwrap_or(false)
        }
        fn bundle_size(&self, _path: &Path) -> io::Result<u64> {
            Ok(0)
        }
        fn volume_kind(&self, _path: &Path) -> VolumeKind {
            VolumeKind::Internal
        }
    }

    #[test]
    fn exclusions_match_exact_and_prefix() {
        let set = ExclusionSet::new(["/home/me/Movies/", "/tmp"]);
        assert!(set.is_excluded(Path::new("/home/me/Movies")));
        assert!(set.is_excluded(Path::new("/home/me/Movies/a.mkv")));
        assert!(set.is_excluded(Path::new("/tmp")));
        assert!(!set.is_excluded(Path::new("/home/me/MoviesOld")));
        assert!(!set.is_excluded(Path::new("/home/me")));
    }

    #[test]
    fn blank_exclusions_are_ignored_and_root_survives() {
        let set = ExclusionSet::new([""]);
        assert!(!set.is_excluded(Path::new("")));
        assert!(!set.is_excluded(&std::env::current_dir().unwrap()));
        let set = ExclusionSet::new(["/"]);
        assert!(set.is_excluded(Path::new("/anything")));
    }

    #[test]
    fn relative_exclusions_become_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let set = ExclusionSet::new(["build/./out/"]);
        assert!(set.is_excluded(&cwd.join("build/out/a.o")));
        assert!(!set.is_excluded(Path::new("build/out/a.o")));
        assert_eq!(absolutize(Path::new(".")).unwrap(), cwd);
    }

    #[test]
    fn verdict_order() {
        let filter = EntryFilter::new(
            ExclusionSet::new(["/skip"]),
            vec![PathBuf::from("/Volumes")],
            Arc::new(NoProbe),
            CancellationToken::new(),
        );
        assert_eq!(filter.verdict(Path::new("/skip/x"), false), Verdict::Prune);
        assert_eq!(filter.verdict(Path::new("/locked/y"), false), Verdict::Prune);
        assert_eq!(filter.verdict(Path::new("/Volumes"), true), Verdict::Prune);
        assert_eq!(filter.verdict(Path::new("/Volumes/usb"), true), Verdict::Keep);
        assert_eq!(filter.verdict(Path::new("/a/Tool.app"), true), Verdict::Bundle);
        assert_eq!(filter.verdict(Path::new("/a/Tool.app"), false), Verdict::Keep);
        assert_eq!(filter.pruned_count(), 3);
    }
}
