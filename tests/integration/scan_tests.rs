use dupesweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupesweep::output::read_list;
use dupesweep::progress::ChannelSink;
use dupesweep::scanner::{HashAlgorithm, HashError, WalkerConfig};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn finder(out: &TempDir) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_list_path(out.path().join("duplicate_files.txt"))
            .with_max_concurrency(8),
    )
}

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_three_file_scenario() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    let a = write(root.path(), "a", b"X");
    let b = write(root.path(), "b", b"X");
    let c = write(root.path(), "c", b"Y");
    let (sink, _progress, duplicates) = ChannelSink::new();

    let report = finder(&out).scan(root.path(), &sink).unwrap();

    assert_eq!(report.duplicate_count(), 1);
    assert_eq!(report.bytes_saved(), 1);

    let listed = read_list(&out.path().join("duplicate_files.txt")).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0] == a || listed[0] == b);
    assert!(!listed.contains(&c));

    let streamed: Vec<_> = duplicates.try_iter().collect();
    assert_eq!(streamed.len(), 1);
    assert_eq!(streamed[0].path, listed[0]);
    assert_ne!(streamed[0].original, streamed[0].path);
}

#[test]
fn test_equivalence_classes_across_subdirectories() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    for i in 0..4 {
        write(root.path(), &format!("one/copy{i}.bin"), b"class one");
    }
    for i in 0..3 {
        write(root.path(), &format!("two/deeper/copy{i}.bin"), b"class two!");
    }
    write(root.path(), "unique.bin", b"unique");
    let (sink, _p, _d) = ChannelSink::new();

    let report = finder(&out).scan(root.path(), &sink).unwrap();

    // 8 files, 3 classes
    assert_eq!(report.files_found, 8);
    assert_eq!(report.stats.originals, 3);
    assert_eq!(report.duplicate_count(), 5);
    assert_eq!(report.bytes_saved(), 3 * 9 + 2 * 10);
}

#[test]
fn test_every_algorithm_finds_same_duplicates() {
    let root = tempdir().unwrap();
    write(root.path(), "a", b"payload");
    write(root.path(), "b", b"payload");
    write(root.path(), "c", b"other");

    for algorithm in HashAlgorithm::ALL {
        let out = tempdir().unwrap();
        let finder = DuplicateFinder::new(
            FinderConfig::default()
                .with_algorithm(algorithm.name())
                .with_list_path(out.path().join("list.txt")),
        );
        let (sink, _p, duplicates) = ChannelSink::new();

        let report = finder.scan(root.path(), &sink).unwrap();

        assert_eq!(report.algorithm, algorithm);
        assert_eq!(report.duplicate_count(), 1, "{algorithm}");
        let record = duplicates.try_recv().unwrap();
        assert_eq!(record.digest.len(), algorithm.hex_len());
    }
}

#[test]
fn test_algorithm_name_is_case_insensitive() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(root.path(), "a", b"1");
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_algorithm("BLAKE3")
            .with_list_path(out.path().join("list.txt")),
    );
    let (sink, _p, _d) = ChannelSink::new();

    assert_eq!(
        finder.scan(root.path(), &sink).unwrap().algorithm,
        HashAlgorithm::Blake3
    );
}

#[test]
fn test_unsupported_algorithm_is_setup_failure() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(root.path(), "a", b"X");
    let list = out.path().join("list.txt");
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_algorithm("foo123")
            .with_list_path(&list),
    );
    let (sink, progress, duplicates) = ChannelSink::new();

    let err = finder.scan(root.path(), &sink).unwrap_err();

    assert!(matches!(
        err,
        FinderError::UnsupportedAlgorithm(HashError::UnsupportedAlgorithm(_))
    ));
    assert!(err.to_string().contains("foo123"));
    assert!(!list.exists());
    assert!(progress.try_recv().is_err());
    assert!(duplicates.try_recv().is_err());
}

#[test]
fn test_empty_directory_reports_zero_files() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (sink, progress, _d) = ChannelSink::new();

    let report = finder(&out).scan(root.path(), &sink).unwrap();

    assert_eq!(report.files_found, 0);
    assert_eq!(report.duplicate_count(), 0);
    assert_eq!(report.stats.hashed, 0);
    let lines: Vec<String> = progress.try_iter().collect();
    assert!(lines.iter().any(|l| l == "Found 0 files"));
    assert!(read_list(&out.path().join("duplicate_files.txt"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_zero_byte_files_are_never_duplicates() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(root.path(), "empty1", b"");
    write(root.path(), "empty2", b"");
    let (sink, progress, _d) = ChannelSink::new();

    let report = finder(&out).scan(root.path(), &sink).unwrap();

    assert_eq!(report.files_found, 0);
    assert_eq!(report.duplicate_count(), 0);
    assert!(progress.try_iter().any(|l| l == "Found 0 files"));
}

#[test]
fn test_nonexistent_root_reports_and_does_not_hash() {
    let out = tempdir().unwrap();
    let missing = out.path().join("nope");
    let (sink, progress, _d) = ChannelSink::new();

    let err = finder(&out).scan(&missing, &sink).unwrap_err();

    assert!(matches!(err, FinderError::RootNotFound(ref p) if p == &missing));
    let lines: Vec<String> = progress.try_iter().collect();
    assert_eq!(
        lines,
        vec![format!("Directory does not exist: {}", missing.display())]
    );
}

#[test]
fn test_rescan_is_idempotent_in_count_and_bytes() {
    let root = tempdir().unwrap();
    for i in 0..10 {
        write(root.path(), &format!("f{i}"), format!("content {}", i % 3).as_bytes());
    }

    let mut results = Vec::new();
    for _ in 0..2 {
        let out = tempdir().unwrap();
        let (sink, _p, _d) = ChannelSink::new();
        let report = finder(&out).scan(root.path(), &sink).unwrap();
        results.push((report.duplicate_count(), report.bytes_saved()));
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[0].0, 7);
}

#[test]
fn test_list_matches_streamed_duplicates() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    for i in 0..6 {
        write(root.path(), &format!("dup{i}"), b"same");
    }
    let (sink, _p, duplicates) = ChannelSink::new();

    let report = finder(&out).scan(root.path(), &sink).unwrap();

    let listed: HashSet<PathBuf> = read_list(&report.list_path).unwrap().into_iter().collect();
    let streamed: HashSet<PathBuf> = duplicates.try_iter().map(|r| r.path).collect();
    let recorded: HashSet<PathBuf> = report.records.iter().map(|r| r.path.clone()).collect();
    assert_eq!(listed.len(), 5);
    assert_eq!(listed, streamed);
    assert_eq!(listed, recorded);
}

#[test]
fn test_rescan_truncates_previous_list() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(root.path(), "a", b"X");
    let b = write(root.path(), "b", b"X");
    let (sink, _p, _d) = ChannelSink::new();

    finder(&out).scan(root.path(), &sink).unwrap();
    fs::remove_file(&b).unwrap();
    let report = finder(&out).scan(root.path(), &sink).unwrap();

    assert_eq!(report.duplicate_count(), 0);
    assert!(read_list(&report.list_path).unwrap().is_empty());
}

#[test]
fn test_walker_filters_apply_to_scan() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(root.path(), "small1", b"ab");
    write(root.path(), "small2", b"ab");
    write(root.path(), "big1", &[7u8; 100]);
    write(root.path(), "big2", &[7u8; 100]);
    write(root.path(), ".hidden/big3", &[7u8; 100]);

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_list_path(out.path().join("list.txt"))
            .with_walker_config(WalkerConfig::new(false, true, Some(10), None)),
    );
    let (sink, _p, _d) = ChannelSink::new();

    let report = finder.scan(root.path(), &sink).unwrap();

    assert_eq!(report.files_found, 2);
    assert_eq!(report.duplicate_count(), 1);
    assert_eq!(report.bytes_saved(), 100);
}

#[test]
fn test_found_file_lines_are_size_ordered() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(root.path(), "large", &[1u8; 300]);
    write(root.path(), "tiny", b"1");
    write(root.path(), "medium", &[2u8; 20]);
    let (sink, progress, _d) = ChannelSink::new();

    finder(&out).scan(root.path(), &sink).unwrap();

    let sizes: Vec<u64> = progress
        .try_iter()
        .filter_map(|l| {
            l.strip_prefix("Found file: ")
                .and_then(|rest| rest.rsplit_once("(size: "))
                .and_then(|(_, n)| n.trim_end_matches(" bytes)").parse().ok())
        })
        .collect();
    assert_eq!(sizes, vec![1, 20, 300]);
}

#[test]
fn test_json_report_only_when_requested() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(root.path(), "a", b"X");
    write(root.path(), "b", b"X");
    let report_path = out.path().join("duplicates.json");

    let (sink, _p, _d) = ChannelSink::new();
    let report = finder(&out).scan(root.path(), &sink).unwrap();
    assert!(report.report_path.is_none());
    assert!(!report_path.exists());

    let with_report = DuplicateFinder::new(
        FinderConfig::default()
            .with_list_path(out.path().join("list.txt"))
            .with_report_path(Some(report_path.clone())),
    );
    let (sink, progress, _d) = ChannelSink::new();
    with_report.scan(root.path(), &sink).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    let entry = &value.as_array().unwrap()[0];
    assert_eq!(entry["FileSize"], 1);
    assert_eq!(entry["Hash"].as_str().unwrap().len(), 64);
    assert!(progress
        .try_iter()
        .any(|l| l == format!("Wrote {}", report_path.display())));
}

#[test]
fn test_unwritable_report_is_not_fatal() {
    let root = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(root.path(), "a", b"X");
    write(root.path(), "b", b"X");
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_list_path(out.path().join("list.txt"))
            .with_report_path(Some(out.path().join("no/such/dir/report.json"))),
    );
    let (sink, progress, _d) = ChannelSink::new();

    let report = finder.scan(root.path(), &sink).unwrap();

    assert_eq!(report.duplicate_count(), 1);
    assert!(report.report_path.is_none());
    assert!(progress.try_iter().any(|l| l.starts_with("Failed to create ")));
}
