/// Bundle directories: application, framework and plug-in packages whose
/// contents are treated as one atomic unit.
use std::io;
use std::path::Path;

/// Directory suffixes that mark a bundle (compared case-insensitively).
const BUNDLE_EXTENSIONS: &[&str] = &[
    "app",
    "appex",
    "bundle",
    "framework",
    "kext",
    "mdimporter",
    "plugin",
    "prefpane",
    "qlgenerator",
    "saver",
    "xpc",
];

/// `true` if the final component carries a bundle suffix.
pub fn has_bundle_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| BUNDLE_EXTENSIONS.iter().any(|b| b.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Total size of every regular file inside a bundle.
///
/// Walks serially on the calling thread. Unreadable entries inside the
/// bundle are skipped; only a failure to stat the bundle itself is an error.
pub fn bundle_size(path: &Path) -> io::Result<u64> {
    std::fs::symlink_metadata(path)?;

    let walker = jwalk::WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(jwalk::Parallelism::Serial);

    let mut total = 0u64;
    for entry in walker.into_iter().flatten() {
        if entry.file_type().is_file() {
            if let Ok(meta) = entry.metadata() {
                total += meta.len();
            }
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn recognises_bundle_suffixes() {
        assert!(has_bundle_extension(Path::new("/Applications/Safari.app")));
        assert!(has_bundle_extension(Path::new("/Library/Frameworks/Foo.FRAMEWORK")));
        assert!(has_bundle_extension(Path::new("/x/Thing.kext")));
        assert!(!has_bundle_extension(Path::new("/x/app")));
        assert!(!has_bundle_extension(Path::new("/x/notes.txt")));
    }

    #[test]
    fn bundle_size_sums_nested_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bundle = tmp.path().join("Demo.app");
        fs::create_dir_all(bundle.join("Contents/MacOS")).unwrap();
        fs::write(bundle.join("Contents/Info.plist"), [0u8; 100]).unwrap();
        fs::write(bundle.join("Contents/MacOS/demo"), [0u8; 900]).unwrap();

        assert_eq!(bundle_size(&bundle).unwrap(), 1_000);
    }

    #[test]
    fn bundle_size_of_missing_path_is_an_error() {
        assert!(bundle_size(Path::new("/no/such/Thing.app")).is_err());
    }
}
