/// System-integrity protected paths.
///
/// Two checks: a cheap prefix blacklist (with carve-outs such as
/// `/usr/local`) and, on macOS, the `SF_RESTRICTED` file flag, which costs
/// a metadata syscall and is therefore only consulted for directories that
/// the blacklist did not already settle.
use crate::config::ScanConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ProtectedPaths {
    prefixes: Vec<PathBuf>,
    exceptions: Vec<PathBuf>,
}

impl ProtectedPaths {
    pub fn new(prefixes: Vec<PathBuf>, exceptions: Vec<PathBuf>) -> Self {
        Self {
            prefixes,
            exceptions,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            config.protected_prefixes.clone(),
            config.protected_exceptions.clone(),
        )
    }

    /// `true` if a blacklist prefix matches and no exception prefix does.
    /// Matching is per path component, so `/usrdata` is not under `/usr`.
    pub fn matches_blacklist(&self, path: &Path) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p))
            && !self.exceptions.iter().any(|e| path.starts_with(e))
    }
}

/// macOS `SF_RESTRICTED` (from `<sys/stat.h>`).
#[cfg(target_os = "macos")]
const SF_RESTRICTED: u32 = 0x0008_0000;

/// Query the platform's restricted flag for `path`.
#[cfg(target_os = "macos")]
pub fn has_restricted_flag(path: &Path) -> bool {
    use std::os::macos::fs::MetadataExt;
    std::fs::symlink_metadata(path)
        .map(|m| m.st_flags() & SF_RESTRICTED != 0)
        .unwrap_or(false)
}

/// Other platforms have no equivalent flag; only the blacklist applies.
#[cfg(not(target_os = "macos"))]
pub fn has_restricted_flag(_path: &Path) -> bool {
    false
}
