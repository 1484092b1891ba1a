use dupesweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupesweep::scanner::{LogicalPath, ScanError, ScanFilter, ScanRoot};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;

fn finder(filter: ScanFilter) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_filter(filter))
}

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (result, summary) = finder(ScanFilter::default())
        .find_duplicates(&[ScanRoot::new(dir.path())])
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"content a").unwrap();
    fs::write(dir.path().join("b.txt"), b"content b").unwrap();
    fs::write(dir.path().join("c.txt"), b"content c").unwrap();

    let (result, summary) = finder(ScanFilter::default())
        .find_duplicates(&[ScanRoot::new(dir.path())])
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.total_files, 3);
}

#[test]
fn test_identical_files_form_one_group() {
    let dir = tempdir().unwrap();
    let data = vec![b'x'; 10 * 1024];
    fs::write(dir.path().join("a.txt"), &data).unwrap();
    fs::write(dir.path().join("b.txt"), &data).unwrap();

    let filter = ScanFilter::default().with_size_range(0, 1000);
    let (result, _) = finder(filter)
        .find_duplicates(&[ScanRoot::new(dir.path())])
        .unwrap();

    assert_eq!(result.group_count(), 1);
    let group = &result.groups()[0];
    assert_eq!(
        group.paths(),
        vec![
            LogicalPath::file(dir.path().join("a.txt")),
            LogicalPath::file(dir.path().join("b.txt")),
        ]
    );
    assert_eq!(result.reclaimable_bytes(), 10 * 1024);
}

#[test]
fn test_extension_allow_list_excludes_everything() {
    let dir = tempdir().unwrap();
    let data = vec![b'x'; 10 * 1024];
    fs::write(dir.path().join("a.txt"), &data).unwrap();
    fs::write(dir.path().join("b.txt"), &data).unwrap();

    let filter = ScanFilter::default()
        .with_size_range(0, 1000)
        .with_extensions(["jpg"]);
    let (result, summary) = finder(filter)
        .find_duplicates(&[ScanRoot::new(dir.path())])
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_zip_member_matches_loose_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("c.txt"), b"same bytes").unwrap();
    write_zip(
        &dir.path().join("x.zip"),
        &[("inner.txt", b"same bytes"), ("other.txt", b"different")],
    );

    let filter = ScanFilter::default().with_search_zip(true);
    let (result, _) = finder(filter)
        .find_duplicates(&[ScanRoot::new(dir.path())])
        .unwrap();

    assert_eq!(result.group_count(), 1);
    assert_eq!(
        result.groups()[0].paths(),
        vec![
            LogicalPath::file(dir.path().join("c.txt")),
            LogicalPath::archive_member(dir.path().join("x.zip"), "inner.txt"),
        ]
    );

    let member = &result.groups()[0].members[1];
    assert_eq!(member.file_name(), "inner.txt");
    assert_eq!(
        member.folder(),
        format!("{}#", dir.path().join("x.zip").display())
    );
}

#[test]
fn test_zip_members_ignored_without_flag() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("c.txt"), b"same bytes").unwrap();
    write_zip(&dir.path().join("x.zip"), &[("inner.txt", b"same bytes")]);

    let (result, _) = finder(ScanFilter::default())
        .find_duplicates(&[ScanRoot::new(dir.path())])
        .unwrap();

    assert!(result.is_empty());
}

#[test]
fn test_duplicates_across_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("photo.jpg"), b"picture").unwrap();
    fs::write(second.path().join("copy.jpg"), b"picture").unwrap();

    let (result, _) = finder(ScanFilter::default())
        .find_duplicates(&[ScanRoot::new(first.path()), ScanRoot::new(second.path())])
        .unwrap();

    assert_eq!(result.group_count(), 1);
    assert_eq!(
        result.groups()[0].members[0].path,
        LogicalPath::file(first.path().join("photo.jpg"))
    );
}

#[test]
fn test_overlapping_roots_do_not_duplicate_members() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(sub.join("b.txt"), b"same").unwrap();

    let (result, _) = finder(ScanFilter::default())
        .find_duplicates(&[ScanRoot::new(dir.path()), ScanRoot::new(&sub)])
        .unwrap();

    assert_eq!(result.group_count(), 1);
    assert_eq!(result.groups()[0].len(), 2);
}

#[test]
fn test_rescan_gives_same_membership() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    for name in ["a.bin", "b.bin", "nested/c.bin"] {
        fs::write(dir.path().join(name), b"dup").unwrap();
    }
    fs::write(dir.path().join("d.bin"), b"two").unwrap();
    fs::write(dir.path().join("nested/e.bin"), b"two").unwrap();

    let roots = [ScanRoot::new(dir.path())];
    let (first, _) = finder(ScanFilter::default()).find_duplicates(&roots).unwrap();
    let (second, _) = finder(ScanFilter::default()).find_duplicates(&roots).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.group_count(), 2);
}

#[test]
fn test_missing_root_aborts_scan() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = finder(ScanFilter::default())
        .find_duplicates(&[ScanRoot::new(&missing)])
        .unwrap_err();

    assert!(matches!(err, FinderError::Scan(ScanError::NotFound(_))));
}

#[test]
fn test_corrupt_archive_is_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();
    fs::write(dir.path().join("broken.zip"), b"this is not a zip file").unwrap();

    let filter = ScanFilter::default().with_search_zip(true);
    let (result, summary) = finder(filter)
        .find_duplicates(&[ScanRoot::new(dir.path())])
        .unwrap();

    assert_eq!(result.group_count(), 1);
    assert!(summary.has_errors());
}

#[test]
fn test_empty_files_are_grouped() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("empty1")).unwrap();
    File::create(dir.path().join("empty2")).unwrap();

    let (result, _) = finder(ScanFilter::default())
        .find_duplicates(&[ScanRoot::new(dir.path())])
        .unwrap();

    assert_eq!(result.group_count(), 1);
    assert_eq!(result.reclaimable_bytes(), 0);
}
