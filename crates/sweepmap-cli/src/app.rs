/// Drives one run: scan, analyse, lay out, report.
use crate::args::Args;
use crate::progress;
use crate::report::{self, Report};
use crate::treemap;
use anyhow::{bail, Context};
use std::io::{self, Write};
use sweepmap_core::layout::layout_treemap;
use sweepmap_core::scanner::progress::ScanProgress;
use sweepmap_core::{analyse, start_scan, CancellationToken, DetectionError, Scanner};
use tracing::{info, warn};

pub fn run(args: Args) -> anyhow::Result<()> {
    let settings = args.settings()?;
    let mode = args.mode();
    let scanner = Scanner::new(settings.scan.clone());

    let handle = start_scan(scanner, mode).context("failed to start scan thread")?;
    let cancel = handle.cancel_token();
    install_interrupt_handler(cancel.clone());

    match progress::follow(&handle.progress_rx, !args.no_progress) {
        Some(ScanProgress::Cancelled) => warn!("Scan interrupted"),
        Some(ScanProgress::Failed { error }) => warn!("Scan failed: {error}"),
        _ => {}
    }
    let outcome = handle.wait()?;

    for skipped in &outcome.skipped {
        warn!("{skipped}");
    }

    let analysis = match analyse(&outcome.records, &settings, &cancel) {
        Ok(analysis) => analysis,
        Err(DetectionError::Cancelled) => bail!("analysis interrupted"),
        Err(err) => return Err(err.into()),
    };
    for unreadable in &analysis.duplicates.unreadable {
        warn!("{unreadable}");
    }

    let map = args.treemap.map(|(width, height)| {
        let items = analysis.sized_items(&outcome.root, &outcome.records, settings.layout.max_depth);
        let segments = layout_treemap(&items, treemap::grid_bounds(width, height), &settings.layout);
        treemap::render(&segments, width, height)
    });

    let report = Report::build(&outcome, &analysis, args.top, map);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report.render_text(&mut out)?;
    out.flush()?;

    if let Some(path) = &args.json {
        report.write_json(path)?;
        info!("Wrote JSON report to {}", path.display());
    }
    if let Some(path) = &args.csv {
        report::write_csv(&analysis.files, path)?;
        info!("Wrote CSV export to {}", path.display());
    }
    Ok(())
}

/// First Ctrl+C cancels the scan; a second one exits immediately.
fn install_interrupt_handler(cancel: CancellationToken) {
    let result = ctrlc::set_handler(move || {
        if cancel.is_cancelled() {
            eprintln!("\nForce quit requested. Exiting...");
            std::process::exit(130);
        }
        eprintln!("\nCancelling... (press Ctrl+C again to force quit)");
        cancel.cancel();
    });
    if let Err(err) = result {
        warn!("Could not install Ctrl+C handler: {err}");
    }
}
