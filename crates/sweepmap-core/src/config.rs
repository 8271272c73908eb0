/// Settings passed explicitly into each operation.
///
/// Nothing here is process-global: a frontend loads (or builds) a
/// [`Settings`] value and hands the relevant section to each stage, which
/// keeps scans reentrant and independently testable.
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One mebibyte: the default duplicate-detection floor.
pub const MIB: u64 = 1024 * 1024;

/// One gibibyte: the default large-file threshold.
pub const GIB: u64 = 1024 * MIB;

/// Every configurable section, as stored in a settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scan: ScanConfig,
    pub categorize: CategorizeOptions,
    pub duplicates: DuplicateOptions,
    pub layout: LayoutOptions,
}

impl Settings {
    /// Load settings from a JSON file. Missing sections and fields fall
    /// back to their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Paths never visited (exact or path-prefix match). Excluded
    /// directories are pruned with their whole subtree.
    pub exclusions: Vec<PathBuf>,

    /// Root walked in `ScanMode::EntireDisk`.
    pub disk_root: PathBuf,

    /// Mount roots for external/network volumes. Skipped in
    /// `EntireDisk` mode; scanned only when targeted explicitly.
    pub volumes_roots: Vec<PathBuf>,

    /// Protected-path blacklist (integrity-protected system locations).
    pub protected_prefixes: Vec<PathBuf>,

    /// Prefixes carved out of the blacklist (e.g. `/usr/local`).
    pub protected_exceptions: Vec<PathBuf>,

    /// Minimum interval between progress reports, in milliseconds.
    pub progress_interval_ms: u64,

    /// Yield the scanning thread every N processed entries.
    pub yield_every: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclusions: default_exclusions(),
            disk_root: default_disk_root(),
            volumes_roots: default_volumes_roots(),
            protected_prefixes: ["/System", "/usr", "/bin", "/sbin", "/var/db", "/private/var/db"]
                .iter()
                .map(PathBuf::from)
                .collect(),
            protected_exceptions: vec![PathBuf::from("/usr/local")],
            progress_interval_ms: 100,
            yield_every: 64,
        }
    }
}

#[cfg(windows)]
fn default_disk_root() -> PathBuf {
    PathBuf::from("C:\\")
}

#[cfg(not(windows))]
fn default_disk_root() -> PathBuf {
    PathBuf::from("/")
}

#[cfg(target_os = "macos")]
fn default_volumes_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/Volumes")]
}

#[cfg(target_os = "linux")]
fn default_volumes_roots() -> Vec<PathBuf> {
    ["/media", "/run/media", "/mnt"].iter().map(PathBuf::from).collect()
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn default_volumes_roots() -> Vec<PathBuf> {
    Vec::new()
}

/// Kernel pseudo-filesystems report bogus sizes and can block on read.
#[cfg(target_os = "linux")]
fn default_exclusions() -> Vec<PathBuf> {
    ["/proc", "/sys", "/dev"].iter().map(PathBuf::from).collect()
}

#[cfg(not(target_os = "linux"))]
fn default_exclusions() -> Vec<PathBuf> {
    Vec::new()
}

/// Categoriser options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizeOptions {
    /// Compute per-extension count/size breakdowns for every category.
    pub detailed_analysis: bool,

    /// Files under a Downloads folder untouched for this many days are
    /// classified as old downloads.
    pub old_download_age_days: u64,

    /// Files at or above this size (bytes) fall into Large Files.
    pub large_file_threshold: u64,

    /// "Now" for age rules. `None` means the wall clock at the start of
    /// the run; pin it to make repeated runs byte-for-byte identical.
    pub reference_time: Option<SystemTime>,
}

impl Default for CategorizeOptions {
    fn default() -> Self {
        Self {
            detailed_analysis: true,
            old_download_age_days: 90,
            large_file_threshold: GIB,
            reference_time: None,
        }
    }
}

/// Duplicate detector options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateOptions {
    /// Files smaller than this (bytes) are not worth hashing.
    pub min_size: u64,

    /// Number of leading bytes hashed in the partial-hash phase.
    pub partial_hash_bytes: usize,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self {
            min_size: MIB,
            partial_hash_bytes: 4 * 1024,
        }
    }
}

/// Treemap layout options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Rectangles narrower or shorter than this are flagged invisible.
    /// They are still laid out so the space they occupy is accounted for.
    pub min_visible_extent: f64,

    /// Upper bound on items packed into a single row.
    pub max_row_items: usize,

    /// Stop descending into directories below this depth.
    pub max_depth: Option<usize>,

    /// Inset applied on every side of a directory before laying out its
    /// children.
    pub padding: f64,

    /// Band reserved at the top of a directory for its label.
    pub header_height: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_visible_extent: 2.0,
            max_row_items: 512,
            max_depth: None,
            padding: 0.0,
            header_height: 0.0,
        }
    }
}
