/// Ordered categorisation rules.
///
/// Each rule is a pure predicate over a record's normalised path facts;
/// the first rule that matches decides the category. Keeping the rules in
/// one table makes the priority order visible and testable.
use crate::config::CategorizeOptions;
use crate::model::{CategoryKind, FileRecord};
use std::time::{Duration, SystemTime};

const SECONDS_PER_DAY: u64 = 24 * 3600;

/// Per-run inputs shared by every rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// "Now" for age comparisons, fixed once per run.
    pub now: SystemTime,
    pub old_download_age: Duration,
    pub large_file_threshold: u64,
}

impl RuleContext {
    pub fn from_options(options: &CategorizeOptions) -> Self {
        Self {
            now: options.reference_time.unwrap_or_else(SystemTime::now),
            old_download_age: Duration::from_secs(
                options.old_download_age_days.saturating_mul(SECONDS_PER_DAY),
            ),
            large_file_threshold: options.large_file_threshold,
        }
    }
}

/// Lowercased, `/`-separated view of a record used by the predicates.
pub struct RecordFacts<'a> {
    pub record: &'a FileRecord,
    /// Full path with any drive prefix removed (`c:/windows` → `/windows`).
    pub path: String,
    pub name: String,
    pub extension: Option<String>,
}

impl<'a> RecordFacts<'a> {
    pub fn new(record: &'a FileRecord) -> Self {
        let mut path = record.path.to_string_lossy().replace('\\', "/").to_lowercase();
        let bytes = path.as_bytes();
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            path.replace_range(..2, "");
        }
        Self {
            record,
            path,
            name: record.name.as_str().to_lowercase(),
            extension: record.extension(),
        }
    }

    /// Ancestor directory names, root first. The record's own name is not
    /// included.
    pub fn dir_segments(&self) -> impl Iterator<Item = &str> {
        let parent_len = self.path.rfind('/').unwrap_or(0);
        self.path[..parent_len].split('/').filter(|s| !s.is_empty())
    }

    fn has_dir(&self, names: &[&str]) -> bool {
        self.dir_segments().any(|s| names.contains(&s))
    }

    fn ext_in(&self, table: &[&str]) -> bool {
        self.extension
            .as_deref()
            .is_some_and(|ext| table.contains(&ext))
    }

    fn under(&self, prefix: &str) -> bool {
        self.path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// One entry in the rule table.
pub struct CategoryRule {
    pub name: &'static str,
    pub category: CategoryKind,
    pub matches: fn(&RecordFacts<'_>, &RuleContext) -> bool,
}

/// Every rule, in priority order.
pub const RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "application bundle",
        category: CategoryKind::Applications,
        matches: is_application,
    },
    CategoryRule {
        name: "system location",
        category: CategoryKind::System,
        matches: is_system,
    },
    CategoryRule {
        name: "cache",
        category: CategoryKind::Caches,
        matches: is_cache,
    },
    CategoryRule {
        name: "log",
        category: CategoryKind::Logs,
        matches: is_log,
    },
    CategoryRule {
        name: "temporary",
        category: CategoryKind::Temporary,
        matches: is_temporary,
    },
    CategoryRule {
        name: "backup",
        category: CategoryKind::Backups,
        matches: is_backup,
    },
    CategoryRule {
        name: "screenshot",
        category: CategoryKind::Screenshots,
        matches: is_screenshot,
    },
    CategoryRule {
        name: "mail attachment",
        category: CategoryKind::MailAttachments,
        matches: is_mail_attachment,
    },
    CategoryRule {
        name: "developer artifact",
        category: CategoryKind::Developer,
        matches: is_developer,
    },
    CategoryRule {
        name: "image extension",
        category: CategoryKind::Images,
        matches: |facts, _| extension_category(facts) == Some(CategoryKind::Images),
    },
    CategoryRule {
        name: "video extension",
        category: CategoryKind::Videos,
        matches: |facts, _| extension_category(facts) == Some(CategoryKind::Videos),
    },
    CategoryRule {
        name: "audio extension",
        category: CategoryKind::Audio,
        matches: |facts, _| extension_category(facts) == Some(CategoryKind::Audio),
    },
    CategoryRule {
        name: "document extension",
        category: CategoryKind::Documents,
        matches: |facts, _| extension_category(facts) == Some(CategoryKind::Documents),
    },
    CategoryRule {
        name: "archive extension",
        category: CategoryKind::Archives,
        matches: |facts, _| extension_category(facts) == Some(CategoryKind::Archives),
    },
    CategoryRule {
        name: "old download",
        category: CategoryKind::OldDownloads,
        matches: is_old_download,
    },
    CategoryRule {
        name: "large file",
        category: CategoryKind::LargeFiles,
        matches: |facts, ctx| facts.record.size >= ctx.large_file_threshold,
    },
];

/// Assign a category to a non-directory record. Falls back to `Other`.
pub fn classify(record: &FileRecord, ctx: &RuleContext) -> CategoryKind {
    let facts = RecordFacts::new(record);
    RULES
        .iter()
        .find(|rule| (rule.matches)(&facts, ctx))
        .map_or(CategoryKind::Other, |rule| rule.category)
}

// ── Rule 1: applications ────────────────────────────────────────────────

const PACKAGE_EXTENSIONS: &[&str] = &["app", "pkg", "mpkg"];

fn is_application(facts: &RecordFacts<'_>, _: &RuleContext) -> bool {
    facts.ext_in(PACKAGE_EXTENSIONS) || facts.dir_segments().any(|s| s.ends_with(".app"))
}

// ── Rule 2: system ──────────────────────────────────────────────────────

const SYSTEM_ROOTS: &[&str] = &[
    "/system", "/library", "/usr", "/bin", "/sbin", "/private", "/windows",
];

const SYSTEM_EXTENSIONS: &[&str] = &[
    "framework", "dylib", "kext", "plugin", "bundle", "so", "dll", "sys",
];

fn in_system_root(facts: &RecordFacts<'_>) -> bool {
    SYSTEM_ROOTS.iter().any(|root| facts.under(root))
}

/// System locations, minus the user-writable subtrees rule 3 owns.
fn is_system(facts: &RecordFacts<'_>, ctx: &RuleContext) -> bool {
    if facts.record.is_protected || facts.ext_in(SYSTEM_EXTENSIONS) {
        return true;
    }
    if !in_system_root(facts) {
        return false;
    }
    // Preference files stay System even under a cache or temp subtree.
    facts.ext_in(&["plist"])
        || !(is_cache(facts, ctx) || is_log(facts, ctx) || is_temporary(facts, ctx))
}

// ── Rule 3: caches, logs, temporary files, backups ──────────────────────

fn is_cache(facts: &RecordFacts<'_>, _: &RuleContext) -> bool {
    facts.has_dir(&["caches", "cache", ".cache"]) || facts.ext_in(&["cache"])
}

fn is_log(facts: &RecordFacts<'_>, _: &RuleContext) -> bool {
    facts.has_dir(&["logs", "log"]) || facts.ext_in(&["log"])
}

/// Per-user temporary roots on macOS (`/var` links to `/private/var`).
const TEMP_ROOTS: &[&str] = &["/private/var/folders", "/var/folders"];

fn is_temporary(facts: &RecordFacts<'_>, _: &RuleContext) -> bool {
    TEMP_ROOTS.iter().any(|root| facts.under(root))
        || facts.has_dir(&["tmp", "temp", ".tmp", "temporaryitems", "temporary items"])
        || facts.ext_in(&["tmp", "temp", "swp", "part", "crdownload"])
}

fn is_backup(facts: &RecordFacts<'_>, _: &RuleContext) -> bool {
    facts.has_dir(&["backups", "backup", "mobilesync"]) || facts.ext_in(&["bak", "backup"])
}

// ── Rule 4: named locations ─────────────────────────────────────────────

const SCREENSHOT_PREFIXES: &[&str] = &["screenshot", "screen shot", "screen recording"];

fn is_screenshot(facts: &RecordFacts<'_>, _: &RuleContext) -> bool {
    let named = SCREENSHOT_PREFIXES.iter().any(|p| facts.name.starts_with(p));
    let in_folder = facts.has_dir(&["screenshots"])
        && matches!(
            extension_category(facts),
            Some(CategoryKind::Images | CategoryKind::Videos)
        );
    named || in_folder
}

fn is_mail_attachment(facts: &RecordFacts<'_>, _: &RuleContext) -> bool {
    facts.has_dir(&["mail downloads"])
        || (facts.has_dir(&["mail"]) && facts.has_dir(&["attachments"]))
}

// ── Rule 5: developer artifacts ─────────────────────────────────────────

const DEVELOPER_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "target",
    "build",
    "dist",
    "deriveddata",
    "__pycache__",
    ".venv",
    "venv",
    ".gradle",
    ".tox",
    ".next",
    "pods",
];

const DEVELOPER_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "cargo.lock",
    "gemfile.lock",
    "poetry.lock",
    "composer.lock",
    "podfile.lock",
    "go.sum",
    "package.json",
    "cargo.toml",
    "pyproject.toml",
    "tsconfig.json",
    "makefile",
    "dockerfile",
    ".gitignore",
];

fn is_developer(facts: &RecordFacts<'_>, _: &RuleContext) -> bool {
    facts.has_dir(DEVELOPER_DIRS) || DEVELOPER_FILES.contains(&facts.name.as_str())
}

// ── Rule 6: extension tables ────────────────────────────────────────────

fn extension_category(facts: &RecordFacts<'_>) -> Option<CategoryKind> {
    facts.extension.as_deref().and_then(categorise_extension)
}

/// Map a file extension onto one of the media/document categories.
///
/// Zero-heap-allocation hot path: extensions are lowercased into a
/// fixed-size stack buffer. Extensions longer than 16 bytes never match.
pub fn categorise_extension(ext: &str) -> Option<CategoryKind> {
    let bytes = ext.as_bytes();
    if bytes.len() > 16 {
        return None;
    }

    let mut lower = [0u8; 16];
    for (dest, &src) in lower.iter_mut().zip(bytes.iter()) {
        *dest = src.to_ascii_lowercase();
    }
    let lower_str = std::str::from_utf8(&lower[..bytes.len()]).ok()?;

    let category = match lower_str {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "ico" | "tiff" | "tif"
        | "psd" | "raw" | "cr2" | "nef" | "dng" | "heic" | "heif" => CategoryKind::Images,
        "mp4" | "mkv" | "avi" | "mov" | "wmv" | "flv" | "webm" | "m4v" | "mpg" | "mpeg" | "3gp" => {
            CategoryKind::Videos
        }
        "mp3" | "wav" | "flac" | "aac" | "ogg" | "wma" | "m4a" | "opus" | "aiff" | "alac" => {
            CategoryKind::Audio
        }
        "doc" | "docx" | "pdf" | "txt" | "rtf" | "odt" | "ods" | "odp" | "xls" | "xlsx"
        | "ppt" | "pptx" | "pages" | "numbers" | "key" | "csv" | "md" | "epub" => {
            CategoryKind::Documents
        }
        "zip" | "rar" | "7z" | "tar" | "gz" | "tgz" | "bz2" | "xz" | "zst" | "cab" | "iso"
        | "dmg" => CategoryKind::Archives,
        _ => return None,
    };
    Some(category)
}

// ── Rules 7 and 8: age and size ─────────────────────────────────────────

fn is_old_download(facts: &RecordFacts<'_>, ctx: &RuleContext) -> bool {
    if !facts.has_dir(&["downloads"]) {
        return false;
    }
    facts
        .record
        .modified
        .and_then(|modified| ctx.now.duration_since(modified).ok())
        .is_some_and(|age| age > ctx.old_download_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GIB;

    const DAY: Duration = Duration::from_secs(24 * 3600);

    fn ctx() -> RuleContext {
        RuleContext {
            now: SystemTime::UNIX_EPOCH + 1_000 * DAY,
            old_download_age: 90 * DAY,
            large_file_threshold: GIB,
        }
    }

    fn kind(path: &str) -> CategoryKind {
        classify(&FileRecord::new_file(path, 10), &ctx())
    }

    #[test]
    fn documents_and_developer_artifacts() {
        assert_eq!(kind("/home/me/report.pdf"), CategoryKind::Documents);
        assert_eq!(
            kind("/home/me/proj/node_modules/left-pad/index.js"),
            CategoryKind::Developer
        );
        assert_eq!(kind("/home/me/proj/Cargo.lock"), CategoryKind::Developer);
    }

    #[test]
    fn application_wins_over_everything() {
        assert_eq!(
            kind("/Applications/Mail.app/Contents/Resources/icon.png"),
            CategoryKind::Applications
        );
        assert_eq!(kind("/Users/me/Downloads/Setup.pkg"), CategoryKind::Applications);
    }

    #[test]
    fn system_locations_carve_out_caches_and_logs() {
        assert_eq!(kind("/usr/share/dict/words"), CategoryKind::System);
        assert_eq!(kind("/Library/Caches/com.foo/data"), CategoryKind::Caches);
        assert_eq!(kind("/Library/Logs/foo.txt"), CategoryKind::Logs);
        assert_eq!(kind("/Library/Preferences/com.apple.x.plist"), CategoryKind::System);
        assert_eq!(kind("C:\\Windows\\notepad.exe"), CategoryKind::System);
        assert_eq!(kind("/home/me/lib/libfoo.so"), CategoryKind::System);
        // Only the root /Library is a system location.
        assert_eq!(kind("/Users/me/Library/notes.txt"), CategoryKind::Documents);
    }

    #[test]
    fn private_scratch_space_is_not_system() {
        assert_eq!(kind("/private/tmp/session.log"), CategoryKind::Logs);
        assert_eq!(kind("/private/tmp/upload.dat"), CategoryKind::Temporary);
        assert_eq!(
            kind("/private/var/folders/ab/T/scratch.tmp"),
            CategoryKind::Temporary
        );
        assert_eq!(
            kind("/private/var/folders/ab/xyz/C/blob.bin"),
            CategoryKind::Temporary
        );
        assert_eq!(kind("/private/etc/hosts"), CategoryKind::System);
        assert_eq!(kind("/private/tmp/com.apple.x.plist"), CategoryKind::System);
    }

    #[test]
    fn huge_download_age_saturates() {
        let options = CategorizeOptions {
            old_download_age_days: u64::MAX,
            ..CategorizeOptions::default()
        };
        let ctx = RuleContext::from_options(&options);
        assert_eq!(ctx.old_download_age, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn protected_records_are_system() {
        let mut record = FileRecord::new_file("/home/me/locked.txt", 1);
        record.is_protected = true;
        assert_eq!(classify(&record, &ctx()), CategoryKind::System);
    }

    #[test]
    fn disposable_buckets() {
        assert_eq!(kind("/Users/me/.cache/pip/wheel.whl"), CategoryKind::Caches);
        assert_eq!(kind("/var/app/server.log"), CategoryKind::Logs);
        assert_eq!(kind("/home/me/tmp/scratch.dat"), CategoryKind::Temporary);
        assert_eq!(kind("/home/me/doc.bak"), CategoryKind::Backups);
    }

    #[test]
    fn named_locations() {
        assert_eq!(
            kind("/Users/me/Desktop/Screenshot 2024-01-01 at 10.00.00.png"),
            CategoryKind::Screenshots
        );
        assert_eq!(
            kind("/Users/me/Library/Containers/com.apple.mail/Data/Library/Mail Downloads/a.docx"),
            CategoryKind::MailAttachments
        );
    }

    #[test]
    fn extension_tables() {
        assert_eq!(kind("/m/a.JPG"), CategoryKind::Images);
        assert_eq!(kind("/m/a.mkv"), CategoryKind::Videos);
        assert_eq!(kind("/m/a.flac"), CategoryKind::Audio);
        assert_eq!(kind("/m/a.7z"), CategoryKind::Archives);
        assert_eq!(kind("/m/a.xyz"), CategoryKind::Other);
        assert_eq!(categorise_extension("averyveryverylongextension"), None);
    }

    #[test]
    fn old_downloads_before_large_files() {
        let c = ctx();
        let old = c.now - 200 * DAY;
        let fresh = c.now - 10 * DAY;

        let record = FileRecord::new_file("/Users/me/Downloads/blob.bin", 2 * GIB)
            .with_modified(old);
        assert_eq!(classify(&record, &c), CategoryKind::OldDownloads);

        let record = FileRecord::new_file("/Users/me/Downloads/blob.bin", 2 * GIB)
            .with_modified(fresh);
        assert_eq!(classify(&record, &c), CategoryKind::LargeFiles);

        // Extension tables take priority over age.
        let record = FileRecord::new_file("/Users/me/Downloads/a.pdf", 1).with_modified(old);
        assert_eq!(classify(&record, &c), CategoryKind::Documents);
    }

    #[test]
    fn large_file_threshold_is_inclusive() {
        let c = ctx();
        assert_eq!(
            classify(&FileRecord::new_file("/d/blob.bin", GIB), &c),
            CategoryKind::LargeFiles
        );
        assert_eq!(
            classify(&FileRecord::new_file("/d/blob.bin", GIB - 1), &c),
            CategoryKind::Other
        );
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }
}
