/// A single scanned file-system entry.
///
/// Records are produced once by the scanner and never mutated afterwards;
/// downstream stages clone what they need. Names use `CompactString` so the
/// common short file name stays inline without a heap allocation.
use super::category::CategoryKind;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path of the entry.
    pub path: PathBuf,

    /// Display name (final path component, or the whole path for roots).
    pub name: CompactString,

    /// Logical size in bytes. For directories this is the sum of all
    /// visible, non-excluded descendants; for bundles the size of the
    /// whole bundle.
    pub size: u64,

    /// `true` for a directory whose children are separate records.
    pub is_dir: bool,

    /// `true` for a bundle directory collapsed into this single record.
    /// Bundles are leaves: `is_dir` is `false` for them.
    pub is_bundle: bool,

    pub modified: Option<SystemTime>,
    pub created: Option<SystemTime>,

    /// Flagged as system-integrity protected.
    pub is_protected: bool,

    /// Category assigned by the categoriser, if any.
    pub category: Option<CategoryKind>,
}

impl FileRecord {
    /// Create a regular file record.
    pub fn new_file(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        Self {
            name: display_name(&path),
            path,
            size,
            is_dir: false,
            is_bundle: false,
            modified: None,
            created: None,
            is_protected: false,
            category: None,
        }
    }

    /// Create a directory record. Its size is filled in by aggregation.
    pub fn new_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            is_dir: true,
            ..Self::new_file(path, 0)
        }
    }

    /// Create a record standing for a whole bundle directory.
    pub fn new_bundle(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            is_bundle: true,
            ..Self::new_file(path, size)
        }
    }

    /// Build a record from `symlink_metadata` output.
    pub fn from_metadata(path: &Path, meta: &Metadata) -> Self {
        let mut record = if meta.is_dir() {
            Self::new_dir(path)
        } else {
            Self::new_file(path, meta.len())
        };
        record.modified = meta.modified().ok();
        record.created = meta.created().ok();
        record
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_created(mut self, created: SystemTime) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_category(mut self, category: CategoryKind) -> Self {
        self.category = Some(category);
        self
    }

    /// Lowercased extension without the dot, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(self.name.as_str())
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }
}

fn display_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.to_string_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_last_component() {
        let r = FileRecord::new_file("/home/me/Report.PDF", 10);
        assert_eq!(r.name, "Report.PDF");
        assert_eq!(r.extension().as_deref(), Some("pdf"));
    }

    #[test]
    fn root_name_falls_back_to_path() {
        let r = FileRecord::new_dir("/");
        assert_eq!(r.name, "/");
        assert!(r.is_dir);
        assert_eq!(r.extension(), None);
    }

    #[test]
    fn bundle_is_a_leaf() {
        let r = FileRecord::new_bundle("/Applications/Safari.app", 4096);
        assert!(r.is_bundle);
        assert!(!r.is_dir);
        assert_eq!(r.extension().as_deref(), Some("app"));
    }

    #[test]
    fn from_metadata_reads_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.bin");
        std::fs::write(&path, [0u8; 42]).unwrap();
        let meta = std::fs::symlink_metadata(&path).unwrap();
        let r = FileRecord::from_metadata(&path, &meta);
        assert_eq!(r.size, 42);
        assert!(r.modified.is_some());

        let dir_meta = std::fs::symlink_metadata(tmp.path()).unwrap();
        let d = FileRecord::from_metadata(tmp.path(), &dir_meta);
        assert!(d.is_dir);
        assert_eq!(d.size, 0);
    }
}
