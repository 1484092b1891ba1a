use dupesweep::actions::{
    selection, ArchiveTool, RemediationAction, RemediationError, RemediationStrategy, Remediator,
};
use dupesweep::duplicates::{DuplicateFinder, FinderConfig, ScanResult};
use dupesweep::scanner::{LogicalPath, ScanFilter, ScanRoot};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use zip::write::SimpleFileOptions;

fn scan(root: &Path, filter: ScanFilter) -> ScanResult {
    DuplicateFinder::new(FinderConfig::default().with_filter(filter))
        .find_duplicates(&[ScanRoot::new(root)])
        .unwrap()
        .0
}

fn three_copies() -> (TempDir, Vec<PathBuf>) {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = ["a.txt", "b.txt", "c.txt"]
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, b"duplicate content").unwrap();
            path
        })
        .collect();
    (dir, paths)
}

fn files(paths: &[&PathBuf]) -> Vec<LogicalPath> {
    paths.iter().map(|p| LogicalPath::file(*p)).collect()
}

#[test]
fn test_permanent_delete_drops_group() {
    let (dir, paths) = three_copies();
    let mut result = scan(dir.path(), ScanFilter::default());
    assert_eq!(result.groups()[0].len(), 3);

    let report = Remediator::default()
        .remediate(
            &RemediationStrategy::PermanentDelete,
            &mut result,
            &files(&[&paths[1], &paths[2]]),
        )
        .unwrap();

    assert_eq!(report.success_count(), 2);
    assert!(report.all_succeeded());
    assert_eq!(report.groups_dropped, 1);
    assert_eq!(report.bytes_reclaimed, 2 * 17);
    assert!(paths[0].exists());
    assert!(!paths[1].exists());
    assert!(!paths[2].exists());
    assert!(result.is_empty());
}

#[test]
fn test_partial_delete_keeps_group() {
    let (dir, paths) = three_copies();
    let mut result = scan(dir.path(), ScanFilter::default());

    Remediator::default()
        .remediate(
            &RemediationStrategy::PermanentDelete,
            &mut result,
            &files(&[&paths[2]]),
        )
        .unwrap();

    assert_eq!(result.group_count(), 1);
    assert_eq!(
        result.groups()[0].paths(),
        files(&[&paths[0], &paths[1]])
    );
}

#[test]
fn test_relocate_without_destination_touches_nothing() {
    let (dir, paths) = three_copies();
    let mut result = scan(dir.path(), ScanFilter::default());
    let before = result.clone();

    let err = Remediator::default()
        .remediate(
            &RemediationStrategy::RelocateToFolder {
                destination: PathBuf::new(),
            },
            &mut result,
            &files(&[&paths[1]]),
        )
        .unwrap_err();

    assert!(matches!(err, RemediationError::Configuration(_)));
    assert!(paths.iter().all(|p| p.exists()));
    assert_eq!(result, before);
}

#[test]
fn test_relocate_moves_into_folder() {
    let (dir, paths) = three_copies();
    let dest = dir.path().join("moved");
    let mut result = scan(dir.path(), ScanFilter::default());

    let report = Remediator::default()
        .remediate(
            &RemediationStrategy::RelocateToFolder {
                destination: dest.clone(),
            },
            &mut result,
            &files(&[&paths[1]]),
        )
        .unwrap();

    assert_eq!(
        report.successes[0].action,
        RemediationAction::Relocated(dest.join("b.txt"))
    );
    assert_eq!(report.bytes_reclaimed, 0);
    assert!(!paths[1].exists());
    assert_eq!(fs::read(dest.join("b.txt")).unwrap(), b"duplicate content");
    assert_eq!(result.groups()[0].len(), 2);
}

#[test]
fn test_relocate_collision_fails_item() {
    let (dir, paths) = three_copies();
    let outside = tempdir().unwrap();
    let dest = outside.path().join("moved");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join("b.txt"), b"already here").unwrap();

    let mut result = scan(dir.path(), ScanFilter::default());
    let report = Remediator::default()
        .remediate(
            &RemediationStrategy::RelocateToFolder {
                destination: dest.clone(),
            },
            &mut result,
            &files(&[&paths[1]]),
        )
        .unwrap();

    assert_eq!(report.failure_count(), 1);
    match &report.failures[0].1 {
        RemediationError::Io { source, .. } => assert_eq!(source.kind(), ErrorKind::AlreadyExists),
        other => panic!("unexpected error: {other}"),
    }
    assert!(paths[1].exists());
    assert_eq!(fs::read(dest.join("b.txt")).unwrap(), b"already here");
    assert!(result.contains(&LogicalPath::file(&paths[1])));
}

#[cfg(unix)]
#[test]
fn test_hardlink_replace_links_to_first_member() {
    use std::os::unix::fs::MetadataExt;

    let (dir, paths) = three_copies();
    let mut result = scan(dir.path(), ScanFilter::default());

    let report = Remediator::default()
        .remediate(
            &RemediationStrategy::HardlinkReplace,
            &mut result,
            &files(&[&paths[1], &paths[2]]),
        )
        .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.groups_dropped, 1);

    let primary = fs::metadata(&paths[0]).unwrap();
    for path in &paths[1..] {
        let meta = fs::metadata(path).unwrap();
        assert_eq!(meta.ino(), primary.ino());
    }
    assert_eq!(primary.nlink(), 3);
}

#[test]
fn test_hardlink_all_selected_is_skipped() {
    let (dir, paths) = three_copies();
    let mut result = scan(dir.path(), ScanFilter::default());

    let report = Remediator::default()
        .remediate(
            &RemediationStrategy::HardlinkReplace,
            &mut result,
            &files(&[&paths[0], &paths[1], &paths[2]]),
        )
        .unwrap();

    assert_eq!(report.success_count(), 0);
    assert_eq!(report.failure_count(), 3);
    assert!(report
        .failures
        .iter()
        .all(|(_, e)| matches!(e, RemediationError::AllMembersSelected { .. })));
    assert_eq!(result.groups()[0].len(), 3);
}

#[test]
fn test_per_item_failures_do_not_stop_batch() {
    let (dir, paths) = three_copies();
    let mut result = scan(dir.path(), ScanFilter::default());

    fs::remove_file(&paths[2]).unwrap();
    let untracked = LogicalPath::file(dir.path().join("never-scanned.txt"));

    let mut selected = files(&[&paths[2], &paths[1]]);
    selected.insert(0, untracked.clone());

    let report = Remediator::default()
        .remediate(&RemediationStrategy::PermanentDelete, &mut result, &selected)
        .unwrap();

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failure_count(), 2);
    assert!(matches!(
        report.failures[0].1,
        RemediationError::NotTracked(_)
    ));
    assert!(matches!(report.failures[1].1, RemediationError::NotFound(_)));
    assert_eq!(report.failures[1].1.path(), Some(&LogicalPath::file(&paths[2])));
    assert!(!paths[1].exists());
    // a.txt and the stale c.txt entry remain.
    assert_eq!(result.groups()[0].len(), 2);
}

#[test]
fn test_selection_helpers_drive_remediation() {
    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep");
    let other = dir.path().join("other");
    fs::create_dir_all(&keep).unwrap();
    fs::create_dir_all(&other).unwrap();
    fs::write(keep.join("a.txt"), b"one").unwrap();
    fs::write(other.join("a.txt"), b"one").unwrap();
    fs::write(other.join("b.txt"), b"two").unwrap();
    fs::write(other.join("c.txt"), b"two").unwrap();

    let mut result = scan(dir.path(), ScanFilter::default());
    assert_eq!(result.group_count(), 2);

    let selected = selection::outside_folder(&result, &keep);
    assert_eq!(selected, vec![LogicalPath::file(other.join("a.txt"))]);

    let report = Remediator::default()
        .remediate(&RemediationStrategy::PermanentDelete, &mut result, &selected)
        .unwrap();

    assert_eq!(report.groups_dropped, 1);
    assert_eq!(result.group_count(), 1);
    assert!(keep.join("a.txt").exists());
}

fn zip_fixture() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let loose = dir.path().join("c.txt");
    fs::write(&loose, b"shared bytes").unwrap();

    let archive = dir.path().join("x.zip");
    let mut writer = zip::ZipWriter::new(File::create(&archive).unwrap());
    writer
        .start_file("inner.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"shared bytes").unwrap();
    writer.finish().unwrap();

    (dir, loose, archive)
}

#[test]
fn test_archive_member_missing_tool_is_per_item_error() {
    let (dir, _loose, archive) = zip_fixture();
    let mut result = scan(dir.path(), ScanFilter::default().with_search_zip(true));
    let member = LogicalPath::archive_member(&archive, "inner.txt");

    let report = Remediator::new(ArchiveTool::new(dir.path().join("no-such-7z")))
        .remediate(
            &RemediationStrategy::TrashMove,
            &mut result,
            std::slice::from_ref(&member),
        )
        .unwrap();

    assert_eq!(report.failure_count(), 1);
    assert!(matches!(
        report.failures[0].1,
        RemediationError::ExternalTool { .. }
    ));
    assert!(result.contains(&member));
}

#[cfg(unix)]
#[test]
fn test_archive_member_uses_tool_for_every_strategy() {
    let (dir, _loose, archive) = zip_fixture();
    let mut result = scan(dir.path(), ScanFilter::default().with_search_zip(true));
    let member = LogicalPath::archive_member(&archive, "inner.txt");

    // `true` accepts any arguments and exits 0, standing in for 7z.
    let report = Remediator::new(ArchiveTool::new("true"))
        .remediate(
            &RemediationStrategy::RelocateToFolder {
                destination: dir.path().join("moved"),
            },
            &mut result,
            std::slice::from_ref(&member),
        )
        .unwrap();

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.successes[0].action, RemediationAction::MemberDeleted);
    assert_eq!(report.groups_dropped, 1);
    assert!(!dir.path().join("moved").exists());
}

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

/// `a.zip` and `b.zip` are byte-identical; `c.txt` matches their `inner.txt`.
fn twin_archives() -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.zip");
    let b = dir.path().join("b.zip");
    let entries: &[(&str, &[u8])] = &[("inner.txt", b"inner bytes"), ("keep.txt", b"keep bytes")];
    write_zip(&a, entries);
    fs::copy(&a, &b).unwrap();
    let loose = dir.path().join("c.txt");
    fs::write(&loose, b"inner bytes").unwrap();
    (dir, a, b, loose)
}

#[cfg(unix)]
#[test]
fn test_member_deletion_untracks_edited_archive() {
    let (dir, a, b, loose) = twin_archives();
    let mut result = scan(dir.path(), ScanFilter::default().with_search_zip(true));
    assert_eq!(result.group_count(), 3);
    assert_eq!(
        result.locate(&LogicalPath::file(&a)).map(|g| g.len()),
        Some(2)
    );

    let report = Remediator::new(ArchiveTool::new("true"))
        .remediate(
            &RemediationStrategy::PermanentDelete,
            &mut result,
            &[LogicalPath::archive_member(&a, "inner.txt")],
        )
        .unwrap();

    assert!(report.all_succeeded());
    // a.zip changed on disk, so it no longer pairs with b.zip
    assert!(!result.contains(&LogicalPath::file(&a)));
    assert!(!result.contains(&LogicalPath::file(&b)));
    assert_eq!(report.groups_dropped, 1);
    assert_eq!(result.group_count(), 2);
    assert!(result.contains(&LogicalPath::file(&loose)));

    // A follow-up batch cannot act on the old pairing
    let report = Remediator::default()
        .remediate(
            &RemediationStrategy::HardlinkReplace,
            &mut result,
            &[LogicalPath::file(&b)],
        )
        .unwrap();
    assert!(matches!(
        report.failures[0].1,
        RemediationError::NotTracked(_)
    ));
}

#[cfg(unix)]
#[test]
fn test_hardlink_never_targets_archive_edited_in_batch() {
    use std::os::unix::fs::MetadataExt;

    let (dir, a, b, _loose) = twin_archives();
    let mut result = scan(dir.path(), ScanFilter::default().with_search_zip(true));

    let selected = vec![
        LogicalPath::file(&b),
        LogicalPath::archive_member(&a, "inner.txt"),
    ];
    let report = Remediator::new(ArchiveTool::new("true"))
        .remediate(&RemediationStrategy::HardlinkReplace, &mut result, &selected)
        .unwrap();

    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failures[0].0, LogicalPath::file(&b));
    assert!(matches!(
        report.failures[0].1,
        RemediationError::Link { .. }
    ));
    assert_eq!(fs::metadata(&b).unwrap().nlink(), 1);
    assert!(!result.contains(&LogicalPath::file(&a)));
}

#[test]
fn test_deleting_archive_untracks_its_members() {
    let (dir, a, b, loose) = twin_archives();
    let mut result = scan(dir.path(), ScanFilter::default().with_search_zip(true));

    let report = Remediator::default()
        .remediate(
            &RemediationStrategy::PermanentDelete,
            &mut result,
            &[LogicalPath::file(&a)],
        )
        .unwrap();

    assert!(report.all_succeeded());
    assert!(!a.exists());
    // Only b.zip#inner.txt and c.txt are still duplicates
    assert_eq!(result.group_count(), 1);
    assert_eq!(
        result.groups()[0].paths(),
        vec![
            LogicalPath::archive_member(&b, "inner.txt"),
            LogicalPath::file(&loose)
        ]
    );
}
