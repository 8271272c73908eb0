/// Scan progress reporting: lightweight messages sent from the scan
/// thread to whoever is watching (a CLI progress bar, a UI thread).
use crate::error::ScanError;
use crate::platform::VolumeKind;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Progress updates emitted while a scan runs.
///
/// Messages carry only counters and status; the records themselves are
/// returned once, when the scan completes.
#[derive(Debug, Clone)]
pub enum ScanProgress {
    /// The root passed validation and traversal is starting.
    Started { root: PathBuf, volume: VolumeKind },
    /// Pass 1: running count of eligible files (the progress denominator).
    Counting { files_counted: u64 },
    /// Pass 2: periodic update with running totals.
    Update {
        files_scanned: u64,
        files_total: u64,
        bytes_scanned: u64,
        current_path: String,
    },
    /// A descendant could not be read and was skipped with its subtree.
    Skipped { path: PathBuf, message: String },
    /// Background scans only: the scan finished successfully.
    Complete {
        duration: Duration,
        files: u64,
        bytes: u64,
        skipped: u64,
    },
    /// Background scans only: the scan observed its cancellation token.
    Cancelled,
    /// Background scans only: the scan aborted before producing results.
    Failed { error: ScanError },
}

impl ScanProgress {
    /// Fraction of pass 2 completed, if this is an `Update`.
    pub fn fraction(&self) -> Option<f64> {
        match self {
            Self::Update {
                files_scanned,
                files_total,
                ..
            } if *files_total > 0 => Some((*files_scanned as f64 / *files_total as f64).min(1.0)),
            _ => None,
        }
    }

    /// `true` for the messages that end a background scan.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete { .. } | Self::Cancelled | Self::Failed { .. }
        )
    }
}

/// Rate limiter for progress messages.
///
/// Reporting per file would flood the consumer on a multi-million entry
/// scan; instead updates go out at most once per `interval`.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// `true` if enough time has passed since the last accepted report.
    /// The first call always succeeds.
    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
