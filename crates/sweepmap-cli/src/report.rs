/// The user-facing report: a plain-text summary on stdout plus optional
/// JSON and CSV exports.
use crate::treemap::AsciiTreemap;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use sweepmap_core::analysis::largest_files;
use sweepmap_core::model::size::{format_count, format_size};
use sweepmap_core::platform::VolumeKind;
use sweepmap_core::{Analysis, FileRecord, ScanOutcome};

/// One category line.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: &'static str,
    pub safety: &'static str,
    pub total_size: u64,
    pub item_count: u64,
    pub average_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<u64>,
    pub largest: Option<PathBuf>,
    /// Extension → bytes; empty in summary mode.
    pub extensions: Vec<(String, u64)>,
}

/// One duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateSummary {
    pub hash: String,
    pub size: u64,
    pub wasted_space: u64,
    pub original: Option<PathBuf>,
    pub copies: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LargeFile {
    pub path: PathBuf,
    pub size: u64,
    pub category: Option<&'static str>,
}

/// Everything printed or exported for one run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub root: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub volume: VolumeKind,
    pub scan_seconds: f64,
    pub analysis_seconds: f64,
    pub files: u64,
    pub bytes: u64,
    pub skipped: Vec<String>,
    pub categories: Vec<CategorySummary>,
    pub duplicates: Vec<DuplicateSummary>,
    pub potential_savings: u64,
    pub largest_files: Vec<LargeFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treemap: Option<AsciiTreemap>,
}

impl Report {
    pub fn build(
        outcome: &ScanOutcome,
        analysis: &Analysis,
        top: usize,
        treemap: Option<AsciiTreemap>,
    ) -> Self {
        let categories = analysis
            .categories
            .iter()
            .map(|c| {
                let mut extensions: Vec<(String, u64)> = c
                    .extension_sizes
                    .iter()
                    .map(|(ext, size)| (ext.clone(), *size))
                    .collect();
                extensions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                CategorySummary {
                    category: c.label(),
                    safety: c.safety.label(),
                    total_size: c.total_size,
                    item_count: c.item_count,
                    average_size: c.average_size,
                    potential_savings: c.potential_savings,
                    largest: c.largest.as_ref().map(|f| f.path.clone()),
                    extensions,
                }
            })
            .collect();

        let duplicates = analysis
            .duplicates
            .groups
            .iter()
            .map(|g| DuplicateSummary {
                hash: g.hash.clone(),
                size: g.size,
                wasted_space: g.wasted_space(),
                original: g.original().map(|f| f.path.clone()),
                copies: g.duplicates().into_iter().map(|f| f.path.clone()).collect(),
            })
            .collect();

        let largest = largest_files(&analysis.files, top)
            .into_iter()
            .map(|f| LargeFile {
                path: f.path.clone(),
                size: f.size,
                category: f.category.map(|c| c.label()),
            })
            .collect();

        Self {
            root: outcome.root.clone(),
            generated_at: Utc::now(),
            volume: outcome.volume,
            scan_seconds: outcome.duration.as_secs_f64(),
            analysis_seconds: analysis.duration.as_secs_f64(),
            files: outcome.files_scanned,
            bytes: outcome.bytes_scanned,
            skipped: outcome.skipped.iter().map(|e| e.to_string()).collect(),
            categories,
            duplicates,
            potential_savings: analysis.duplicates.potential_savings(),
            largest_files: largest,
            treemap,
        }
    }

    pub fn render_text(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "SweepMap report for {}", self.root.display())?;
        writeln!(
            out,
            "  {} files, {} on a {} volume, scanned in {:.2}s",
            format_count(self.files),
            format_size(self.bytes),
            self.volume.label().to_lowercase(),
            self.scan_seconds
        )?;
        if !self.skipped.is_empty() {
            writeln!(out, "  {} entries could not be read", self.skipped.len())?;
        }

        writeln!(out)?;
        writeln!(out, "Categories")?;
        for c in &self.categories {
            writeln!(
                out,
                "  {:<18} {:>10}  {:>9} items  [{}]",
                c.category,
                format_size(c.total_size),
                format_count(c.item_count),
                c.safety
            )?;
            for (ext, size) in c.extensions.iter().take(3) {
                writeln!(out, "      .{:<14} {:>10}", ext, format_size(*size))?;
            }
        }

        if !self.duplicates.is_empty() {
            writeln!(out)?;
            writeln!(
                out,
                "Duplicates: {} groups, {} reclaimable",
                self.duplicates.len(),
                format_size(self.potential_savings)
            )?;
            for group in self.duplicates.iter().take(10) {
                writeln!(
                    out,
                    "  {} x {} ({} wasted)",
                    group.copies.len() + 1,
                    format_size(group.size),
                    format_size(group.wasted_space)
                )?;
                if let Some(original) = &group.original {
                    writeln!(out, "    keep  {}", original.display())?;
                }
                for copy in &group.copies {
                    writeln!(out, "    copy  {}", copy.display())?;
                }
            }
        }

        if !self.largest_files.is_empty() {
            writeln!(out)?;
            writeln!(out, "Largest files")?;
            for file in &self.largest_files {
                writeln!(
                    out,
                    "  {:>10}  {}",
                    format_size(file.size),
                    file.path.display()
                )?;
            }
        }

        if let Some(map) = &self.treemap {
            writeln!(out)?;
            write!(out, "{}", map.to_text())?;
        }
        Ok(())
    }

    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("failed to write {}", path.display()))?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    path: &'a Path,
    size: u64,
    category: &'static str,
    safety: &'static str,
    modified: Option<String>,
    is_bundle: bool,
}

/// Write one row per categorised file, largest first.
pub fn write_csv(files: &[FileRecord], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut ordered: Vec<&FileRecord> = files.iter().collect();
    ordered.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));

    for file in ordered {
        let (category, safety) = match file.category {
            Some(kind) => (kind.label(), kind.safety().label()),
            None => ("", ""),
        };
        writer.serialize(CsvRow {
            path: &file.path,
            size: file.size,
            category,
            safety,
            modified: file
                .modified
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339()),
            is_bundle: file.is_bundle,
        })?;
    }
    writer.flush()?;
    Ok(())
}
