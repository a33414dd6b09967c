use dupesweep::actions::{delete_from_list, DeleteConfig, DeleteError, NoProgress};
use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
use dupesweep::output::read_list;
use dupesweep::progress::ChannelSink;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_scan_then_delete_round_trip() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    let list = out.path().join("duplicate_files.txt");
    for i in 0..4 {
        fs::write(root.path().join(format!("copy{i}")), b"identical").unwrap();
    }
    fs::write(root.path().join("distinct"), b"distinct").unwrap();

    let (sink, _p, _d) = ChannelSink::new();
    let report = DuplicateFinder::new(FinderConfig::default().with_list_path(&list))
        .scan(root.path(), &sink)
        .unwrap();
    assert_eq!(report.duplicate_count(), 3);

    // One listed file disappears before the deletion phase.
    let listed = read_list(&list).unwrap();
    fs::remove_file(&listed[0]).unwrap();

    let result = delete_from_list::<NoProgress>(&list, &DeleteConfig::default(), None).unwrap();

    assert_eq!(result.removed(), 2);
    assert_eq!(result.skipped(), 1);
    assert_eq!(result.bytes_freed, 18);
    for path in &listed {
        assert!(!path.exists());
    }

    // Exactly one copy of each content survives.
    let remaining: Vec<_> = fs::read_dir(root.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(remaining.len(), 2);
    assert!(root.path().join("distinct").exists());
}

#[test]
fn test_second_deletion_skips_everything() {
    let root = tempdir().unwrap();
    let list = root.path().join("list.txt");
    let a = root.path().join("a");
    let b = root.path().join("b");
    fs::write(&a, b"1").unwrap();
    fs::write(&b, b"2").unwrap();
    fs::write(&list, format!("{}\n{}\n", a.display(), b.display())).unwrap();

    let first = delete_from_list::<NoProgress>(&list, &DeleteConfig::default(), None).unwrap();
    let second = delete_from_list::<NoProgress>(&list, &DeleteConfig::default(), None).unwrap();

    assert_eq!(first.summary(), "Deletion complete: removed 2, skipped 0");
    assert_eq!(second.summary(), "Deletion complete: removed 0, skipped 2");
}

#[test]
fn test_empty_list_is_a_no_op() {
    let dir = tempdir().unwrap();
    let list = dir.path().join("list.txt");
    fs::write(&list, "\n   \n").unwrap();

    let result = delete_from_list::<NoProgress>(&list, &DeleteConfig::default(), None).unwrap();
    assert_eq!(result.total_count(), 0);
}

#[test]
fn test_missing_list_is_the_only_fatal_case() {
    let dir = tempdir().unwrap();
    let err = delete_from_list::<NoProgress>(
        &dir.path().join("never-written.txt"),
        &DeleteConfig::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, DeleteError::ListUnreadable(_)));
}
