/// SweepMap Core: scanning, categorisation, duplicate detection and treemap layout.
///
/// This crate contains all analysis logic with zero UI dependencies.
/// Frontends (the bundled CLI, or a GUI) consume its plain data types.
///
/// # Modules
///
/// - [`model`]: `FileRecord`, the index-arena `FileTree`, size formatting.
/// - [`scanner`]: Two-pass, cancellable background filesystem scanning.
/// - [`analysis`]: Categoriser, aggregator, duplicate detector, top files.
/// - [`layout`]: Squarified treemap layout engine.
/// - [`platform`]: Protected paths, bundles and volume classification.
/// - [`config`]: Serializable settings passed into every operation.
/// - [`pipeline`]: Categorise and detect duplicates concurrently.
pub mod analysis;
pub mod cancel;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod platform;
pub mod scanner;

pub use analysis::{categorize, detect_duplicates, Category, CategoryKind, DuplicateGroup};
pub use cancel::CancellationToken;
pub use config::Settings;
pub use error::{ConfigError, DetectionError, ScanError};
pub use layout::{layout_treemap, LayoutSegment, Rect, SizedItem};
pub use model::{FileRecord, FileTree};
pub use pipeline::{analyse, Analysis};
pub use scanner::{scan, start_scan, ScanHandle, ScanMode, ScanOutcome, Scanner};
