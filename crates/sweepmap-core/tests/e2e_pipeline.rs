/// Scan → analyse → layout over real temporary trees.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use sweepmap_core::config::{ScanConfig, Settings};
use sweepmap_core::layout::{layout_treemap, Rect};
use sweepmap_core::model::CategoryKind;
use sweepmap_core::{analyse, categorize, detect_duplicates, CancellationToken, FileRecord, ScanMode, Scanner};
use tempfile::TempDir;

const MB: usize = 1_000_000;

fn scan_records(root: &Path) -> Vec<FileRecord> {
    Scanner::new(ScanConfig::default())
        .scan(
            &ScanMode::SpecificFolder(root.to_path_buf()),
            |_| {},
            &CancellationToken::new(),
        )
        .unwrap()
        .records
}

/// Move records under a neutral root so categorisation does not depend on
/// where the temporary directory lives (e.g. a `tmp` path segment).
fn rebase(records: &[FileRecord], from: &Path) -> Vec<FileRecord> {
    records
        .iter()
        .map(|r| {
            let rel = r.path.strip_prefix(from).unwrap();
            let mut rebased = if r.is_dir {
                FileRecord::new_dir(Path::new("/scan").join(rel))
            } else {
                FileRecord::new_file(Path::new("/scan").join(rel), r.size)
            };
            rebased.size = r.size;
            rebased.modified = r.modified;
            rebased
        })
        .collect()
}

fn pinned_settings() -> Settings {
    let mut settings = Settings::default();
    settings.categorize.reference_time = Some(SystemTime::now());
    settings
}

#[test]
fn two_identical_five_megabyte_files_form_one_group() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let same = vec![0x5au8; 5 * MB];
    let mut different = same.clone();
    different[5 * MB / 2] = 0;
    fs::write(tmp.path().join("one.bin"), &same).unwrap();
    fs::write(tmp.path().join("two.bin"), &same).unwrap();
    fs::write(tmp.path().join("three.bin"), &different).unwrap();

    let records = scan_records(tmp.path());
    let groups = detect_duplicates(&records, 1024 * 1024, &CancellationToken::new()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].count(), 2);
    assert_eq!(groups[0].wasted_space(), 5 * MB as u64);
    let names: Vec<_> = groups[0].members.iter().map(|m| m.name.to_string()).collect();
    assert_eq!(names, vec!["one.bin", "two.bin"]);
}

#[test]
fn document_and_developer_files_are_categorised() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    fs::create_dir_all(tmp.path().join("web/node_modules/pkg")).unwrap();
    fs::write(tmp.path().join("report.pdf"), b"%PDF-1.7").unwrap();
    fs::write(tmp.path().join("web/node_modules/pkg/index.js"), b"module.exports = 1;").unwrap();

    let records = rebase(&scan_records(tmp.path()), tmp.path());
    let categories = categorize(&records, &[], &pinned_settings().categorize);

    let kind_of = |name: &str| {
        categories
            .iter()
            .find(|c| c.files.iter().any(|f| f.name == name))
            .map(|c| c.kind)
    };
    assert_eq!(kind_of("report.pdf"), Some(CategoryKind::Documents));
    assert_eq!(kind_of("index.js"), Some(CategoryKind::Developer));
}

#[test]
fn categorisation_partitions_files_and_is_idempotent() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    for dir in ["docs", "pics", "Library/Caches/app", "proj/target/debug"] {
        fs::create_dir_all(tmp.path().join(dir)).unwrap();
    }
    for (path, size) in [
        ("docs/a.pdf", 10),
        ("docs/b.txt", 20),
        ("pics/c.jpg", 30),
        ("Library/Caches/app/blob", 40),
        ("proj/target/debug/app", 50),
        ("loose", 60),
    ] {
        fs::write(tmp.path().join(path), vec![1u8; size]).unwrap();
    }

    let records = rebase(&scan_records(tmp.path()), tmp.path());
    let settings = pinned_settings();
    let first = categorize(&records, &[], &settings.categorize);
    let second = categorize(&records, &[], &settings.categorize);
    assert_eq!(first, second);

    let mut seen: Vec<PathBuf> = first
        .iter()
        .flat_map(|c| c.files.iter().map(|f| f.path.clone()))
        .collect();
    let count = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), count, "a file landed in two categories");
    assert_eq!(count, records.iter().filter(|r| !r.is_dir).count());

    let total: u64 = first.iter().map(|c| c.total_size).sum();
    assert_eq!(total, 210);
}

#[test]
fn full_pipeline_lays_out_the_scanned_tree() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    fs::create_dir_all(tmp.path().join("a")).unwrap();
    fs::write(tmp.path().join("a/x.bin"), vec![1u8; 3000]).unwrap();
    fs::write(tmp.path().join("a/y.bin"), vec![2u8; 1000]).unwrap();
    fs::write(tmp.path().join("z.bin"), vec![3u8; 4000]).unwrap();

    let records = scan_records(tmp.path());
    let settings = pinned_settings();
    let analysis = analyse(&records, &settings, &CancellationToken::new()).unwrap();
    assert_eq!(analysis.files.len(), 3);
    assert_eq!(analysis.total_size(), 8000);

    let items = analysis.sized_items(tmp.path(), &records, None);
    let bounds = Rect::new(0.0, 0.0, 80.0, 50.0);
    let segments = layout_treemap(&items, bounds, &settings.layout);

    assert_eq!(segments.len(), 2);
    let top_area: f64 = segments.iter().map(|s| s.rect.area()).sum();
    assert!((top_area - bounds.area()).abs() < 1e-6);

    let dir = segments.iter().find(|s| s.is_dir).unwrap();
    assert_eq!(dir.children.len(), 2);
    let child_area: f64 = dir.children.iter().map(|c| c.rect.area()).sum();
    assert!((child_area - dir.rect.area()).abs() < 1e-6);
    assert!(dir.children.iter().all(|c| c.category.is_some()));
}
