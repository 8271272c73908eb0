/// Data model shared by every stage.
pub mod category;
pub mod file_record;
pub mod file_tree;
pub mod size;

pub use category::{CategoryKind, SafetyLevel};
pub use file_record::FileRecord;
pub use file_tree::{FileNode, FileTree, NodeId};
