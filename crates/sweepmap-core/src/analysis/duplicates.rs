/// Duplicate file detection (size-first, then partial hash, then full hash).
///
/// Each phase only hashes files that survived the previous one:
/// 1. Group files by exact size: a unique size cannot be a duplicate.
///    Symlinks and other non-regular files are dropped here, and on Unix
///    hard links to one inode collapse to a single member.
/// 2. SHA-256 the first few KiB of each size-matched file.
/// 3. SHA-256 the full content of files whose prefixes collide.
///
/// Hashing fans out over the rayon pool in fixed-size chunks so
/// cancellation is observed promptly between chunks and per file.
use crate::cancel::CancellationToken;
use crate::config::DuplicateOptions;
use crate::error::DetectionError;
use crate::model::FileRecord;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fs::{File, Metadata};
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Buffer size for streaming file reads (64 KiB).
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Files hashed per parallel chunk in the partial-hash phase.
const PARTIAL_CHUNK: usize = 64;

/// Files hashed per parallel chunk in the full-hash phase.
const FULL_CHUNK: usize = 8;

type Sha256Hash = [u8; 32];

/// A set of files with byte-identical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Lowercase hex SHA-256 of the shared content.
    pub hash: String,
    /// Size of each member in bytes.
    pub size: u64,
    /// Members sorted by path.
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Space reclaimable by keeping only one copy.
    pub fn wasted_space(&self) -> u64 {
        self.size * (self.members.len() as u64).saturating_sub(1)
    }

    /// The member to keep: earliest creation time, ties broken by path.
    /// Members without a creation time sort after those with one.
    pub fn original(&self) -> Option<&FileRecord> {
        self.members
            .iter()
            .min_by(|a, b| creation_key(a).cmp(&creation_key(b)))
    }

    /// Every member except [`original`](Self::original).
    pub fn duplicates(&self) -> Vec<&FileRecord> {
        let original = self.original().map(|r| r.path.as_path());
        self.members
            .iter()
            .filter(|r| Some(r.path.as_path()) != original)
            .collect()
    }
}

fn creation_key(record: &FileRecord) -> (bool, Option<std::time::SystemTime>, &Path) {
    (record.created.is_none(), record.created, record.path.as_path())
}

/// Groups plus the files that could not be read along the way.
#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    pub groups: Vec<DuplicateGroup>,
    /// Always `UnreadableFile`.
    pub unreadable: Vec<DetectionError>,
}

impl DuplicateReport {
    /// Sum of wasted space across all groups.
    pub fn potential_savings(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }
}

pub struct DuplicateDetector {
    options: DuplicateOptions,
}

impl DuplicateDetector {
    pub fn new(options: DuplicateOptions) -> Self {
        Self { options }
    }

    /// Run the three-phase funnel over `records`.
    ///
    /// Directories, bundles, empty files and files below the minimum size
    /// are ignored. Returns [`DetectionError::Cancelled`] (and no groups)
    /// if `cancel` fires at any point.
    pub fn detect(
        &self,
        records: &[FileRecord],
        cancel: &CancellationToken,
    ) -> Result<DuplicateReport, DetectionError> {
        if cancel.is_cancelled() {
            return Err(DetectionError::Cancelled);
        }
        let min_size = self.options.min_size.max(1);
        let unreadable = Mutex::new(Vec::new());

        // Phase 1: exact size.
        let mut by_size: BTreeMap<u64, Vec<&FileRecord>> = BTreeMap::new();
        for record in records {
            if !record.is_dir && !record.is_bundle && record.size >= min_size {
                by_size.entry(record.size).or_default().push(record);
            }
        }
        let candidates: Vec<&FileRecord> = by_size
            .into_values()
            .filter(|group| group.len() >= 2)
            .map(|group| distinct_regular_files(group, &unreadable))
            .filter(|group| group.len() >= 2)
            .flatten()
            .collect();
        debug!("Duplicate phase 1: {} size-matched candidates", candidates.len());

        // Phase 2: hash of the leading bytes.
        let prefix = self.options.partial_hash_bytes as u64;
        let partial = hash_in_chunks(&candidates, PARTIAL_CHUNK, Some(prefix), cancel, &unreadable)?;
        let candidates = collisions(partial);
        debug!("Duplicate phase 2: {} prefix-matched candidates", candidates.len());

        // Phase 3: full content hash.
        let full = hash_in_chunks(&candidates, FULL_CHUNK, None, cancel, &unreadable)?;

        let mut by_content: BTreeMap<(u64, Sha256Hash), Vec<&FileRecord>> = BTreeMap::new();
        for (record, hash) in full {
            by_content.entry((record.size, hash)).or_default().push(record);
        }
        let mut groups: Vec<DuplicateGroup> = by_content
            .into_iter()
            .filter(|(_, members)| members.len() >= 2)
            .map(|((size, hash), members)| {
                let mut members: Vec<FileRecord> = members.into_iter().cloned().collect();
                members.sort_by(|a, b| a.path.cmp(&b.path));
                DuplicateGroup {
                    hash: to_hex(&hash),
                    size,
                    members,
                }
            })
            .collect();

        groups.sort_by(|a, b| {
            b.wasted_space()
                .cmp(&a.wasted_space())
                .then_with(|| a.hash.cmp(&b.hash))
        });

        let report = DuplicateReport {
            groups,
            unreadable: unreadable.into_inner(),
        };
        info!(
            "Duplicate detection complete: {} groups, {} bytes reclaimable, {} unreadable",
            report.groups.len(),
            report.potential_savings(),
            report.unreadable.len()
        );
        Ok(report)
    }
}

/// Find duplicate files among `records` at or above `min_size` bytes.
pub fn detect_duplicates(
    records: &[FileRecord],
    min_size: u64,
    cancel: &CancellationToken,
) -> Result<Vec<DuplicateGroup>, DetectionError> {
    let options = DuplicateOptions {
        min_size,
        ..DuplicateOptions::default()
    };
    DuplicateDetector::new(options)
        .detect(records, cancel)
        .map(|report| report.groups)
}

/// Drop members that are not regular files on disk and keep one path per
/// inode. Members keep their input order.
fn distinct_regular_files<'a>(
    group: Vec<&'a FileRecord>,
    unreadable: &Mutex<Vec<DetectionError>>,
) -> Vec<&'a FileRecord> {
    let mut inodes = HashSet::new();
    let mut kept = Vec::with_capacity(group.len());
    for record in group {
        let meta = match std::fs::symlink_metadata(&record.path) {
            Ok(meta) => meta,
            Err(err) => {
                report_unreadable(unreadable, record, &err);
                continue;
            }
        };
        if !meta.file_type().is_file() {
            debug!("Not a regular file, skipping {}", record.path.display());
            continue;
        }
        if let Some(identity) = file_identity(&meta) {
            if !inodes.insert(identity) {
                debug!("Hard link, skipping {}", record.path.display());
                continue;
            }
        }
        kept.push(record);
    }
    kept
}

#[cfg(unix)]
fn file_identity(meta: &Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn file_identity(_meta: &Metadata) -> Option<(u64, u64)> {
    None
}

fn report_unreadable(
    unreadable: &Mutex<Vec<DetectionError>>,
    record: &FileRecord,
    err: &io::Error,
) {
    warn!("Skipping unreadable file {}: {err}", record.path.display());
    unreadable.lock().push(DetectionError::UnreadableFile {
        path: record.path.clone(),
        cause: err.to_string(),
    });
}

/// Keep only the files whose (size, hash) key is shared with another.
fn collisions(hashed: Vec<(&FileRecord, Sha256Hash)>) -> Vec<&FileRecord> {
    let mut by_key: BTreeMap<(u64, Sha256Hash), Vec<&FileRecord>> = BTreeMap::new();
    for (record, hash) in hashed {
        by_key.entry((record.size, hash)).or_default().push(record);
    }
    by_key
        .into_values()
        .filter(|group| group.len() >= 2)
        .flatten()
        .collect()
}

fn hash_in_chunks<'a>(
    files: &[&'a FileRecord],
    chunk_size: usize,
    limit: Option<u64>,
    cancel: &CancellationToken,
    unreadable: &Mutex<Vec<DetectionError>>,
) -> Result<Vec<(&'a FileRecord, Sha256Hash)>, DetectionError> {
    let mut hashed = Vec::with_capacity(files.len());

    for chunk in files.chunks(chunk_size) {
        if cancel.is_cancelled() {
            return Err(DetectionError::Cancelled);
        }

        let results: Vec<Option<(&'a FileRecord, Sha256Hash)>> = chunk
            .par_iter()
            .map(|&record| {
                if cancel.is_cancelled() {
                    return None;
                }
                match hash_file(&record.path, limit) {
                    Ok(hash) => Some((record, hash)),
                    Err(err) => {
                        report_unreadable(unreadable, record, &err);
                        None
                    }
                }
            })
            .collect();

        if cancel.is_cancelled() {
            return Err(DetectionError::Cancelled);
        }
        hashed.extend(results.into_iter().flatten());
        std::thread::yield_now();
    }

    Ok(hashed)
}

/// Streaming SHA-256 of a file, or of its first `limit` bytes.
fn hash_file(path: &Path, limit: Option<u64>) -> io::Result<Sha256Hash> {
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
    let mut reader: Box<dyn Read> = match limit {
        Some(n) => Box::new(reader.take(n)),
        None => Box::new(reader),
    };

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    Ok(hash)
}

fn to_hex(hash: &Sha256Hash) -> String {
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}
