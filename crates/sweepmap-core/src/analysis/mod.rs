/// Analysis modules: post-scan algorithms over a record snapshot.
///
/// Categorisation and duplicate detection are independent of each other
/// and may run concurrently; aggregation joins their outputs.
pub mod aggregate;
pub mod categorize;
pub mod duplicates;
pub mod rules;
pub mod top_files;

pub use crate::model::CategoryKind;
pub use aggregate::{aggregate, Category};
pub use categorize::{assign_categories, categorize};
pub use duplicates::{detect_duplicates, DuplicateDetector, DuplicateGroup, DuplicateReport};
pub use rules::{categorise_extension, classify, RuleContext};
pub use top_files::largest_files;
