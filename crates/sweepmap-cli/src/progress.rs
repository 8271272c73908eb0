/// Terminal progress display for a running scan.
use crossbeam_channel::Receiver;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use sweepmap_core::model::size::{format_count, format_size};
use sweepmap_core::scanner::progress::ScanProgress;
use tracing::debug;

// ── Styles ──────────────────────────────────────────────────────

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .map(|s| s.tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"))
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  {spinner:.green} [{bar:40.cyan/dim}] {pos}/{len} ({percent}%) {msg}")
        .map(|s| s.progress_chars("━━╾─"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

// ── Display ─────────────────────────────────────────────────────

/// Drains the scan's progress channel into a spinner (pass 1) and a
/// bar (pass 2). Returns the terminal message, or `None` if the channel
/// closed without one.
pub fn follow(rx: &Receiver<ScanProgress>, visible: bool) -> Option<ScanProgress> {
    let bar = if visible {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    bar.set_style(spinner_style());
    bar.enable_steady_tick(Duration::from_millis(100));

    let mut counting = true;
    for msg in rx.iter() {
        match &msg {
            ScanProgress::Started { root, volume } => {
                bar.set_message(format!(
                    "Scanning {} ({} volume)",
                    root.display(),
                    volume.label().to_lowercase()
                ));
            }
            ScanProgress::Counting { files_counted } => {
                bar.set_message(format!("Counting files... {}", format_count(*files_counted)));
            }
            ScanProgress::Update {
                files_scanned,
                files_total,
                bytes_scanned,
                ..
            } => {
                if counting {
                    counting = false;
                    bar.set_style(bar_style());
                    bar.set_length(*files_total);
                }
                bar.set_position(*files_scanned);
                bar.set_message(format_size(*bytes_scanned));
            }
            ScanProgress::Skipped { path, message } => {
                debug!("Skipped {}: {message}", path.display());
            }
            ScanProgress::Complete { .. } | ScanProgress::Cancelled | ScanProgress::Failed { .. } => {
                bar.finish_and_clear();
                return Some(msg);
            }
        }
    }
    bar.finish_and_clear();
    None
}
