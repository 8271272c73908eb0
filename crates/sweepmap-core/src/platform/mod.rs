/// Platform-specific queries behind a small capability interface.
///
/// The scanner only ever talks to [`FsProbe`], so its traversal logic is
/// platform-agnostic and tests can substitute a fake probe.
pub mod bundle;
pub mod protected;
pub mod volume;

pub use protected::ProtectedPaths;
pub use volume::{classify_volume, VolumeKind};

use crate::config::ScanConfig;
use std::io;
use std::path::Path;

/// Path queries the scanner needs from the host platform.
///
/// Implementations must be pure functions of the path (plus file-system
/// state) and safe to call from the walker's worker threads.
pub trait FsProbe: Send + Sync {
    /// `true` if `path` is integrity-protected and must not be emitted.
    /// `is_dir` lets implementations reserve expensive checks for
    /// directories.
    fn is_protected(&self, path: &Path, is_dir: bool) -> bool;

    /// `true` if the directory at `path` is a bundle to be sized as one unit.
    fn is_bundle(&self, path: &Path) -> bool;

    /// Aggregate size of a bundle directory.
    fn bundle_size(&self, path: &Path) -> io::Result<u64>;

    /// Kind of volume holding `path`.
    fn volume_kind(&self, path: &Path) -> VolumeKind;
}

/// The host platform's implementation.
#[derive(Debug, Clone, Default)]
pub struct NativeProbe {
    protected: ProtectedPaths,
}

impl NativeProbe {
    pub fn new(protected: ProtectedPaths) -> Self {
        Self { protected }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(ProtectedPaths::from_config(config))
    }
}

impl FsProbe for NativeProbe {
    fn is_protected(&self, path: &Path, is_dir: bool) -> bool {
        if self.protected.matches_blacklist(path) {
            return true;
        }
        is_dir && protected::has_restricted_flag(path)
    }

    fn is_bundle(&self, path: &Path) -> bool {
        bundle::has_bundle_extension(path)
    }

    fn bundle_size(&self, path: &Path) -> io::Result<u64> {
        bundle::bundle_size(path)
    }

    fn volume_kind(&self, path: &Path) -> VolumeKind {
        classify_volume(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_probe_uses_configured_blacklist() {
        let probe = NativeProbe::from_config(&ScanConfig::default());
        assert!(probe.is_protected(Path::new("/System/Library"), true));
        assert!(!probe.is_protected(Path::new("/usr/local/share"), true));
        assert!(probe.is_bundle(Path::new("/Applications/Mail.app")));
        assert!(!probe.is_bundle(Path::new("/Applications")));
    }
}
