/// SweepMap CLI: terminal frontend over `sweepmap-core`.
///
/// Parses arguments, runs a background scan with a progress bar, then
/// prints the categorised report and writes the optional exports.
pub mod app;
pub mod args;
pub mod progress;
pub mod report;
pub mod treemap;

pub use app::run;
pub use args::Args;
