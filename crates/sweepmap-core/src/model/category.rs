/// Category identifiers and their default safety tiers.
use serde::{Deserialize, Serialize};

/// How safe it is, by default, to reclaim space from a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SafetyLevel {
    /// Regenerable or disposable content (caches, temp files, duplicates).
    Safe,
    /// User content, review before removing.
    Caution,
    /// Removing it can break the system or installed software.
    Dangerous,
}

impl SafetyLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Caution => "Caution",
            Self::Dangerous => "Dangerous",
        }
    }
}

/// Semantic buckets a file can be assigned to.
///
/// Declaration order is also the tie-break order when two categories have
/// the same total size, so sorting is fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryKind {
    Duplicates,
    Applications,
    System,
    Caches,
    Logs,
    Temporary,
    Backups,
    Screenshots,
    MailAttachments,
    Developer,
    Images,
    Videos,
    Audio,
    Documents,
    Archives,
    OldDownloads,
    LargeFiles,
    Other,
}

impl CategoryKind {
    /// Every category, in declaration order.
    pub const ALL: [CategoryKind; 18] = [
        Self::Duplicates,
        Self::Applications,
        Self::System,
        Self::Caches,
        Self::Logs,
        Self::Temporary,
        Self::Backups,
        Self::Screenshots,
        Self::MailAttachments,
        Self::Developer,
        Self::Images,
        Self::Videos,
        Self::Audio,
        Self::Documents,
        Self::Archives,
        Self::OldDownloads,
        Self::LargeFiles,
        Self::Other,
    ];

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Duplicates => "Duplicates",
            Self::Applications => "Applications",
            Self::System => "System",
            Self::Caches => "Caches",
            Self::Logs => "Logs",
            Self::Temporary => "Temporary Files",
            Self::Backups => "Backups",
            Self::Screenshots => "Screenshots",
            Self::MailAttachments => "Mail Attachments",
            Self::Developer => "Developer",
            Self::Images => "Images",
            Self::Videos => "Videos",
            Self::Audio => "Audio",
            Self::Documents => "Documents",
            Self::Archives => "Archives",
            Self::OldDownloads => "Old Downloads",
            Self::LargeFiles => "Large Files",
            Self::Other => "Other",
        }
    }

    /// Fixed default safety tier.
    pub fn safety(self) -> SafetyLevel {
        match self {
            Self::Duplicates
            | Self::Caches
            | Self::Logs
            | Self::Temporary
            | Self::Screenshots
            | Self::OldDownloads => SafetyLevel::Safe,
            Self::Applications | Self::System => SafetyLevel::Dangerous,
            Self::Backups
            | Self::MailAttachments
            | Self::Developer
            | Self::Images
            | Self::Videos
            | Self::Audio
            | Self::Documents
            | Self::Archives
            | Self::LargeFiles
            | Self::Other => SafetyLevel::Caution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_declaration_order() {
        let mut sorted = CategoryKind::ALL;
        sorted.sort();
        assert_eq!(sorted, CategoryKind::ALL);
    }

    #[test]
    fn system_locations_are_dangerous() {
        assert_eq!(CategoryKind::System.safety(), SafetyLevel::Dangerous);
        assert_eq!(CategoryKind::Caches.safety(), SafetyLevel::Safe);
        assert_eq!(CategoryKind::Documents.safety(), SafetyLevel::Caution);
    }
}
