/// Scanner module: orchestrates filesystem scanning.
///
/// A scan validates its root, then walks it twice with `jwalk`:
/// - **Pass 1:** count eligible files so progress has a denominator.
/// - **Pass 2:** stat every surviving entry and emit [`FileRecord`]s.
///
/// Directory sizes are aggregated bottom-up through a [`FileTree`] before
/// the records are returned. A scan can run inline via [`Scanner::scan`]
/// or on a background thread via [`start_scan`].
pub mod filter;
pub mod progress;
mod walk;

use crate::cancel::CancellationToken;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::model::{FileRecord, FileTree};
use crate::platform::{FsProbe, NativeProbe, VolumeKind};
use filter::{absolutize, EntryFilter, ExclusionSet};
use progress::ScanProgress;
use walk::WalkSettings;

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What to scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    /// The configured disk root, skipping mounted volumes.
    EntireDisk,
    /// One folder, including any volumes mounted beneath it.
    SpecificFolder(PathBuf),
}

impl ScanMode {
    pub fn root(&self, config: &ScanConfig) -> PathBuf {
        match self {
            Self::EntireDisk => config.disk_root.clone(),
            Self::SpecificFolder(path) => path.clone(),
        }
    }
}

/// Result of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub root: PathBuf,
    /// The root directory record first, then every descendant in path
    /// order. Directory sizes are aggregated.
    pub records: Vec<FileRecord>,
    /// Descendants that could not be read (always `EnumerationFailed`).
    pub skipped: Vec<ScanError>,
    pub files_scanned: u64,
    pub bytes_scanned: u64,
    /// Entries dropped by exclusion, protection, or mount-root rules.
    pub pruned: u64,
    pub duration: Duration,
    pub volume: VolumeKind,
}

impl ScanOutcome {
    /// Rebuild the directory hierarchy from the records.
    pub fn tree(&self) -> FileTree {
        FileTree::from_records(&self.root, self.records.clone())
    }
}

/// A configured scanner. Holds no per-scan state, so one value can run
/// any number of sequential or concurrent scans.
#[derive(Clone)]
pub struct Scanner {
    config: ScanConfig,
    probe: Arc<dyn FsProbe>,
}

impl Scanner {
    /// Scanner backed by the host platform's [`NativeProbe`].
    pub fn new(config: ScanConfig) -> Self {
        let probe = Arc::new(NativeProbe::from_config(&config));
        Self { config, probe }
    }

    pub fn with_probe(config: ScanConfig, probe: Arc<dyn FsProbe>) -> Self {
        Self { config, probe }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Validate the root for `mode` and classify its volume without
    /// walking anything.
    pub fn preflight(&self, mode: &ScanMode) -> Result<VolumeKind, ScanError> {
        let root = validate_root(&mode.root(&self.config))?;
        Ok(self.probe.volume_kind(&root))
    }

    /// Scan synchronously on the calling thread.
    ///
    /// `progress` receives `Started`, `Counting`, `Update` and `Skipped`
    /// messages. A cancelled scan returns [`ScanError::Cancelled`] and
    /// discards everything collected so far.
    pub fn scan<F>(
        &self,
        mode: &ScanMode,
        mut progress: F,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ScanError>
    where
        F: FnMut(ScanProgress),
    {
        let start = Instant::now();
        let root = validate_root(&mode.root(&self.config))?;

        let volume = self.probe.volume_kind(&root);
        if volume.is_slow() {
            warn!(
                "Scan root {} is on a {} volume; enumeration may be slow",
                root.display(),
                volume.label().to_lowercase()
            );
        }
        info!("Starting scan of {} ({:?})", root.display(), mode);
        progress(ScanProgress::Started {
            root: root.clone(),
            volume,
        });

        let skipped_roots = match mode {
            ScanMode::EntireDisk => self
                .config
                .volumes_roots
                .iter()
                .filter_map(|p| absolutize(p).ok())
                .collect(),
            ScanMode::SpecificFolder(_) => Vec::new(),
        };
        // One filter per pass so the pruned counter reflects a single walk.
        let make_filter = || {
            Arc::new(EntryFilter::new(
                ExclusionSet::new(&self.config.exclusions),
                skipped_roots.clone(),
                self.probe.clone(),
                cancel.clone(),
            ))
        };
        let filter = make_filter();

        if filter.rejects_root(&root) {
            warn!(
                "Scan root {} is excluded or protected; nothing to scan",
                root.display()
            );
            return Ok(ScanOutcome {
                root,
                records: Vec::new(),
                skipped: Vec::new(),
                files_scanned: 0,
                bytes_scanned: 0,
                pruned: 1,
                duration: start.elapsed(),
                volume,
            });
        }

        let settings = WalkSettings {
            progress_interval: Duration::from_millis(self.config.progress_interval_ms),
            yield_every: self.config.yield_every,
        };

        let files_total = walk::count_pass(&root, filter, settings, &mut progress)?;
        debug!("Pass 1 complete: {files_total} eligible files");

        let filter = make_filter();
        let walked = walk::emit_pass(&root, filter.clone(), settings, files_total, &mut progress)?;
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut records = Vec::with_capacity(walked.records.len() + 1);
        records.push(root_record(&root));
        records.extend(walked.records);
        let records = FileTree::from_records(&root, records).into_records();

        let duration = start.elapsed();
        info!(
            "Scan complete: {} files, {} bytes, {} skipped, {} pruned in {duration:?}",
            walked.files,
            walked.bytes,
            walked.skipped.len(),
            filter.pruned_count()
        );

        Ok(ScanOutcome {
            root,
            records,
            skipped: walked.skipped,
            files_scanned: walked.files,
            bytes_scanned: walked.bytes,
            pruned: filter.pruned_count(),
            duration,
            volume,
        })
    }
}

fn root_record(root: &Path) -> FileRecord {
    let mut record = FileRecord::new_dir(root);
    if let Ok(meta) = std::fs::metadata(root) {
        record.modified = meta.modified().ok();
        record.created = meta.created().ok();
    }
    record
}

/// Check that `root` is a listable directory and return its absolute form.
fn validate_root(root: &Path) -> Result<PathBuf, ScanError> {
    let meta = match std::fs::metadata(root) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            return Err(ScanError::PermissionDenied {
                path: root.to_path_buf(),
            })
        }
        Err(err) => {
            return Err(ScanError::InvalidRoot {
                path: root.to_path_buf(),
                reason: err.to_string(),
            })
        }
    };
    if !meta.is_dir() {
        return Err(ScanError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "not a directory".into(),
        });
    }
    match std::fs::read_dir(root) {
        Ok(_) => absolutize(root).map_err(|err| ScanError::InvalidRoot {
            path: root.to_path_buf(),
            reason: err.to_string(),
        }),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            Err(ScanError::PermissionDenied {
                path: root.to_path_buf(),
            })
        }
        Err(err) => Err(ScanError::InvalidRoot {
            path: root.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

/// Scan with the given probe and return only the records.
pub fn scan<F>(
    mode: &ScanMode,
    config: &ScanConfig,
    probe: Arc<dyn FsProbe>,
    progress: F,
    cancel: &CancellationToken,
) -> Result<Vec<FileRecord>, ScanError>
where
    F: FnMut(ScanProgress),
{
    Scanner::with_probe(config.clone(), probe)
        .scan(mode, progress, cancel)
        .map(|outcome| outcome.records)
}

/// Maximum number of progress messages that may queue up in the channel.
///
/// Progress is already throttled, so the queue only fills if the consumer
/// stops draining it; the scanner then blocks on `send` rather than
/// growing the heap.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Handle to a running or completed background scan.
pub struct ScanHandle {
    /// Receiver for progress updates. The last message is always one of
    /// `Complete`, `Cancelled` or `Failed`.
    pub progress_rx: Receiver<ScanProgress>,
    cancel: CancellationToken,
    thread: thread::JoinHandle<Result<ScanOutcome, ScanError>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A token sharing this scan's cancellation flag.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Block until the scan thread finishes and return its result.
    pub fn wait(self) -> Result<ScanOutcome, ScanError> {
        match self.thread.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Start a scan on a background thread.
pub fn start_scan(scanner: Scanner, mode: ScanMode) -> io::Result<ScanHandle> {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    let thread = thread::Builder::new()
        .name("sweepmap-scanner".into())
        .spawn(move || {
            let tx = progress_tx.clone();
            let result = scanner.scan(
                &mode,
                move |msg| {
                    let _ = tx.send(msg);
                },
                &cancel_clone,
            );

            let terminal = match &result {
                Ok(outcome) => ScanProgress::Complete {
                    duration: outcome.duration,
                    files: outcome.files_scanned,
                    bytes: outcome.bytes_scanned,
                    skipped: outcome.skipped.len() as u64,
                },
                Err(ScanError::Cancelled) => {
                    info!("Scan cancelled");
                    ScanProgress::Cancelled
                }
                Err(error) => ScanProgress::Failed {
                    error: error.clone(),
                },
            };
            let _ = progress_tx.send(terminal);
            result
        })?;

    Ok(ScanHandle {
        progress_rx,
        cancel,
        thread,
    })
}
