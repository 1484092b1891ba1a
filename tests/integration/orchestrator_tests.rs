use dupesweep::actions::{selection, RemediationStrategy};
use dupesweep::duplicates::FinderError;
use dupesweep::orchestrator::{Orchestrator, ScanStats};
use dupesweep::scanner::{ScanFilter, ScanRoot};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_poll_background_scan_until_done() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), vec![b'a'; 4096]).unwrap();
    fs::write(dir.path().join("b.txt"), vec![b'a'; 4096]).unwrap();

    let mut orchestrator = Orchestrator::new(ScanFilter::default());
    let mut task = orchestrator
        .start_scan(vec![ScanRoot::new(dir.path())])
        .unwrap();

    let outcome = loop {
        if let Some(outcome) = task.try_result() {
            break outcome;
        }
        thread::sleep(Duration::from_millis(5));
    };

    let (result, summary) = outcome.unwrap();
    assert_eq!(summary.total_files, 2);

    let stats = orchestrator.publish(result);
    assert_eq!(
        stats,
        ScanStats {
            total_files: 2,
            group_count: 1,
            reclaimable_bytes: 4096,
        }
    );
    assert!(stats
        .to_string()
        .starts_with("Total files: 2, duplicate groups: 1, space to be freed: 4"));
}

#[test]
fn test_cancelled_scan_publishes_nothing() {
    let dir = tempdir().unwrap();
    for i in 0..50 {
        fs::write(dir.path().join(format!("{i}.dat")), b"same").unwrap();
    }

    let mut orchestrator = Orchestrator::new(ScanFilter::default());
    orchestrator.scan(vec![ScanRoot::new(dir.path())]).unwrap();
    let published = orchestrator.result().clone();
    assert_eq!(published.group_count(), 1);

    fs::write(dir.path().join("extra.dat"), b"same").unwrap();
    let task = orchestrator
        .start_scan(vec![ScanRoot::new(dir.path())])
        .unwrap();
    task.cancel();
    assert!(task.is_cancelled());

    assert!(matches!(task.wait(), Err(FinderError::Interrupted)));
    assert_eq!(orchestrator.result(), &published);
}

#[test]
fn test_shared_shutdown_flag_interrupts_scan() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"x").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let mut orchestrator =
        Orchestrator::new(ScanFilter::default()).with_shutdown_flag(Arc::clone(&flag));

    let err = orchestrator
        .scan(vec![ScanRoot::new(dir.path())])
        .unwrap_err();
    assert!(matches!(err, FinderError::Interrupted));

    flag.store(false, Ordering::SeqCst);
    assert!(orchestrator.scan(vec![ScanRoot::new(dir.path())]).is_ok());
}

#[test]
fn test_scan_without_roots_is_configuration_error() {
    let mut orchestrator = Orchestrator::new(ScanFilter::default());
    assert!(matches!(
        orchestrator.scan(Vec::new()),
        Err(FinderError::Configuration(_))
    ));
}

#[test]
fn test_scan_then_remediate_updates_stats() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(dir.path().join(name), vec![b'z'; 1024]).unwrap();
    }

    let mut orchestrator = Orchestrator::new(ScanFilter::default());
    let stats = orchestrator
        .scan(vec![ScanRoot::new(dir.path()).with_scan_self(false)])
        .unwrap();
    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.reclaimable_bytes, 2048);

    let selected = selection::all_but_first(orchestrator.result());
    let report = orchestrator
        .remediate(&RemediationStrategy::PermanentDelete, &selected)
        .unwrap();

    assert_eq!(report.success_count(), 2);
    assert_eq!(orchestrator.stats(), ScanStats::default());
    assert!(dir.path().join("a.txt").exists());
}

#[test]
fn test_rescan_after_filter_change() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.jpg"), b"img").unwrap();
    fs::write(dir.path().join("b.jpg"), b"img").unwrap();
    fs::write(dir.path().join("a.txt"), b"doc").unwrap();
    fs::write(dir.path().join("b.txt"), b"doc").unwrap();

    let mut orchestrator = Orchestrator::new(ScanFilter::default());
    assert_eq!(
        orchestrator
            .scan(vec![ScanRoot::new(dir.path())])
            .unwrap()
            .group_count,
        2
    );

    orchestrator.set_filter(ScanFilter::default().with_skip_extensions(["txt"]));
    assert_eq!(
        orchestrator
            .scan(vec![ScanRoot::new(dir.path())])
            .unwrap()
            .group_count,
        1
    );
}
