/// Error taxonomy for the core operations.
///
/// Root-level failures abort an operation; per-entry failures are recovered
/// where they happen and surface as diagnostics carrying these same types.
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the scanner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    /// The root does not exist or is not a directory.
    #[error("invalid scan root '{}': {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    /// The root (or required top-level access) was refused by the OS.
    #[error("permission denied reading '{}'", path.display())]
    PermissionDenied { path: PathBuf },

    /// The scan observed its cancellation token and stopped.
    #[error("scan cancelled")]
    Cancelled,

    /// A descendant could not be enumerated. Recovered locally: the entry
    /// and its subtree are skipped and the scan continues.
    #[error("could not read '{}': {cause}", path.display())]
    EnumerationFailed { path: PathBuf, cause: String },
}

/// Failures raised by the duplicate detector.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectionError {
    /// Detection observed its cancellation token and stopped.
    #[error("duplicate detection cancelled")]
    Cancelled,

    /// A candidate could not be opened or read while hashing. Recovered
    /// locally: the file is dropped from consideration.
    #[error("could not read '{}' for hashing: {cause}", path.display())]
    UnreadableFile { path: PathBuf, cause: String },
}

/// Failures loading a settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read settings file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
