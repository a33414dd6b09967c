use dupesweep::duplicates::{
    DuplicateDetector, DuplicateFinder, FinderConfig, HashResult, WorkerPool,
};
use dupesweep::output::DuplicateList;
use dupesweep::progress::ChannelSink;
use dupesweep::scanner::{FileRecord, HashAlgorithm, HashError, Hasher};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_files_do_not_stop_the_batch() {
    let dir = tempdir().unwrap();
    let mut records = Vec::new();
    for i in 0..3 {
        let path = dir.path().join(format!("present{i}"));
        fs::write(&path, b"shared").unwrap();
        records.push(FileRecord::new(path, 6));
    }
    for i in 0..3 {
        records.push(FileRecord::new(dir.path().join(format!("vanished{i}")), 6));
    }

    let stream = WorkerPool::new(2)
        .unwrap()
        .run(records, Hasher::new(HashAlgorithm::Sha1), None)
        .unwrap();
    let results: Vec<HashResult> = stream.collect();

    assert_eq!(results.len(), 6);
    let failures: Vec<_> = results.iter().filter_map(HashResult::error).collect();
    assert_eq!(failures.len(), 3);
    assert!(failures.iter().all(|e| matches!(e, HashError::NotFound(_))));
}

#[test]
fn test_detector_reports_errors_and_still_finds_duplicates() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"dup").unwrap();
    fs::write(&b, b"dup").unwrap();
    let subdir = dir.path().join("not-a-file");
    fs::create_dir(&subdir).unwrap();

    let records = vec![
        FileRecord::new(a, 3),
        FileRecord::new(dir.path().join("gone"), 3),
        FileRecord::new(subdir.clone(), 3),
        FileRecord::new(b, 3),
    ];
    let stream = WorkerPool::new(4)
        .unwrap()
        .run(records, Hasher::default(), None)
        .unwrap();

    let (sink, progress, _d) = ChannelSink::new();
    let list = DuplicateList::create(&dir.path().join("list.txt")).unwrap();
    let outcome = DuplicateDetector::new(list, &sink).consume(stream).unwrap();

    assert_eq!(outcome.stats.duplicates, 1);
    assert_eq!(outcome.stats.hash_errors, 2);
    let errors: Vec<String> = progress
        .try_iter()
        .filter(|l| l.starts_with("ERR: "))
        .collect();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|l| l.contains(&subdir.display().to_string())));
}

#[cfg(unix)]
#[test]
fn test_unreadable_entries_are_skipped_and_reported() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"shared").unwrap();
    fs::write(dir.path().join("b"), b"shared").unwrap();
    let locked_dir = dir.path().join("locked");
    fs::create_dir(&locked_dir).unwrap();
    fs::write(locked_dir.join("hidden_copy"), b"shared").unwrap();
    let locked_file = dir.path().join("secret");
    fs::write(&locked_file, b"private").unwrap();
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o000)).unwrap();
    fs::set_permissions(&locked_file, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits are not enforced for root.
    let enforced = fs::File::open(&locked_file).is_err() && fs::read_dir(&locked_dir).is_err();

    let (sink, progress, _d) = ChannelSink::new();
    let result = DuplicateFinder::new(
        FinderConfig::default().with_list_path(out.path().join("list.txt")),
    )
    .scan(dir.path(), &sink);

    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();
    fs::set_permissions(&locked_file, fs::Permissions::from_mode(0o644)).unwrap();

    let report = result.unwrap();
    if !enforced {
        return;
    }

    assert_eq!(report.files_found, 3);
    assert_eq!(report.duplicate_count(), 1);
    assert_eq!(report.stats.hash_errors, 1);

    let errors: Vec<String> = progress
        .try_iter()
        .filter(|l| l.starts_with("ERR: "))
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(&locked_file.display().to_string()));
    assert!(errors[0].contains("hash failed (Permission denied"));
}
