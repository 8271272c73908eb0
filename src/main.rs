//! SweepMap: disk usage analyser.
//!
//! Thin binary entry point. All logic lives in the `sweepmap-core`
//! and `sweepmap-cli` crates.

fn main() -> anyhow::Result<()> {
    let args = sweepmap_cli::Args::from_env();

    // Logs go to stderr so the report on stdout stays clean.
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("SweepMap starting");
    sweepmap_cli::run(args)
}
