/// Command-line argument definitions.
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sweepmap_core::config::Settings;
use sweepmap_core::model::size::parse_size;
use sweepmap_core::ScanMode;

/// Analyse disk usage: categorised totals, duplicate files and a treemap.
#[derive(Parser, Debug, Clone)]
#[command(name = "sweepmap", version, about, long_about = None)]
pub struct Args {
    /// Folder to analyse (defaults to the current directory)
    #[arg(value_name = "PATH", conflicts_with = "entire_disk")]
    pub path: Option<PathBuf>,

    /// Scan the whole disk instead of one folder; mounted volumes are skipped
    #[arg(long)]
    pub entire_disk: bool,

    /// Path to exclude, with everything below it (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Path to a JSON settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Smallest file considered for duplicate detection, e.g. 512KB or 4M
    #[arg(long, value_name = "SIZE", value_parser = parse_size_arg)]
    pub min_dup_size: Option<u64>,

    /// Files at or above this size count as large, e.g. 2GB
    #[arg(long, value_name = "SIZE", value_parser = parse_size_arg)]
    pub large_file_size: Option<u64>,

    /// Skip the per-extension breakdowns
    #[arg(long)]
    pub summary: bool,

    /// Number of largest files to list
    #[arg(long, value_name = "N", default_value_t = 10)]
    pub top: usize,

    /// Draw a treemap of the top-level entries, e.g. 80x24
    #[arg(long, value_name = "WxH", value_parser = parse_dimensions)]
    pub treemap: Option<(u16, u16)>,

    /// Write the full report as JSON to FILE
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Write every categorised file as CSV to FILE
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse `std::env::args`, exiting with usage on error.
    pub fn from_env() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    pub fn mode(&self) -> ScanMode {
        if self.entire_disk {
            ScanMode::EntireDisk
        } else {
            ScanMode::SpecificFolder(self.path.clone().unwrap_or_else(|| PathBuf::from(".")))
        }
    }

    /// Settings from `--config` (or defaults), with command-line flags
    /// applied on top.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };

        settings.scan.exclusions.extend(self.exclude.iter().cloned());
        if let Some(size) = self.min_dup_size {
            settings.duplicates.min_size = size;
        }
        if let Some(size) = self.large_file_size {
            settings.categorize.large_file_threshold = size;
        }
        if self.summary {
            settings.categorize.detailed_analysis = false;
        }
        Ok(settings)
    }
}

fn parse_size_arg(input: &str) -> Result<u64, String> {
    parse_size(input).ok_or_else(|| format!("invalid size '{input}' (try 512KB, 4M, 1.5GB)"))
}

fn parse_dimensions(input: &str) -> Result<(u16, u16), String> {
    let err = || format!("invalid dimensions '{input}' (expected WxH, e.g. 80x24)");
    let (w, h) = input.split_once(['x', 'X']).ok_or_else(err)?;
    let w: u16 = w.trim().parse().map_err(|_| err())?;
    let h: u16 = h.trim().parse().map_err(|_| err())?;
    if w == 0 || h == 0 {
        return Err(err());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "sweepmap",
            "/data",
            "-x",
            "/data/cache",
            "--min-dup-size",
            "4M",
            "--summary",
            "--treemap",
            "80x24",
        ]);
        assert_eq!(args.mode(), ScanMode::SpecificFolder(PathBuf::from("/data")));
        assert_eq!(args.treemap, Some((80, 24)));

        let settings = args.settings().unwrap();
        assert_eq!(settings.duplicates.min_size, 4 * 1024 * 1024);
        assert!(!settings.categorize.detailed_analysis);
        assert!(settings
            .scan
            .exclusions
            .contains(&PathBuf::from("/data/cache")));
    }

    #[test]
    fn entire_disk_conflicts_with_path() {
        assert!(Args::try_parse_from(["sweepmap", "--entire-disk", "/x"]).is_err());
        let args = Args::parse_from(["sweepmap", "--entire-disk"]);
        assert_eq!(args.mode(), ScanMode::EntireDisk);
    }

    #[test]
    fn bad_sizes_and_dimensions_are_rejected() {
        assert!(Args::try_parse_from(["sweepmap", "--min-dup-size", "lots"]).is_err());
        assert!(Args::try_parse_from(["sweepmap", "--treemap", "80"]).is_err());
        assert!(Args::try_parse_from(["sweepmap", "--treemap", "0x10"]).is_err());
    }

    #[test]
    fn verbose_raises_log_level() {
        assert_eq!(Args::parse_from(["sweepmap"]).log_level(), tracing::Level::INFO);
        assert_eq!(
            Args::parse_from(["sweepmap", "-v"]).log_level(),
            tracing::Level::DEBUG
        );
    }
}
