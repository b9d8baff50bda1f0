use std::fs;
use std::path::Path;

use snapsweep_dedup::{
    DedupConfig, DedupError, DedupEvent, DeleteMode, Deduplicator, ErrorPolicy, WarningKind,
    deduplicate, hash_file,
};
use tempfile::TempDir;

fn count_files(root: &Path) -> usize {
    let mut count = 0;
    for entry in fs::read_dir(root).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            count += count_files(&path);
        } else {
            count += 1;
        }
    }
    count
}

#[test]
fn test_first_seen_wins() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("a.txt"), "shared bytes").unwrap();
    fs::write(root.join("b.txt"), "something else").unwrap();
    fs::write(root.join("c.txt"), "shared bytes").unwrap();

    let report = deduplicate(root).unwrap();

    assert!(root.join("a.txt").exists());
    assert!(root.join("b.txt").exists());
    assert!(!root.join("c.txt").exists());
    assert_eq!(count_files(root), 2);

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.files_kept, 2);
    assert_eq!(report.duplicate_count(), 1);
    assert_eq!(report.duplicates[0].path, root.join("c.txt"));
    assert_eq!(report.duplicates[0].original, root.join("a.txt"));
    assert_eq!(report.bytes_reclaimed, "shared bytes".len() as u64);
}

#[test]
fn test_nested_directories_walk_depth_first() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("a_dir/inner")).unwrap();
    fs::write(root.join("a_dir/inner/deep.jpg"), "photo").unwrap();
    fs::write(root.join("a_dir/x.jpg"), "photo").unwrap();
    fs::write(root.join("b.jpg"), "photo").unwrap();
    fs::write(root.join("c.jpg"), "other photo").unwrap();

    let report = Deduplicator::new().deduplicate(root).unwrap();

    assert!(root.join("a_dir/inner/deep.jpg").exists());
    assert!(!root.join("a_dir/x.jpg").exists());
    assert!(!root.join("b.jpg").exists());
    assert!(root.join("c.jpg").exists());
    assert_eq!(report.duplicate_count(), 2);
    assert!(
        report
            .duplicates
            .iter()
            .all(|d| d.original == root.join("a_dir/inner/deep.jpg"))
    );
}

#[test]
fn test_no_duplicates_leaves_tree_alone() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("one.txt"), "content one").unwrap();
    fs::write(root.join("two.txt"), "content two").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/three.txt"), "content three").unwrap();

    let report = deduplicate(root).unwrap();

    assert!(!report.has_duplicates());
    assert_eq!(report.files_scanned, 3);
    assert_eq!(count_files(root), 3);
}

#[test]
fn test_empty_directory() {
    let temp = TempDir::new().unwrap();
    let report = deduplicate(temp.path()).unwrap();
    assert_eq!(report.files_scanned, 0);
    assert!(!report.has_duplicates());
}

#[test]
fn test_dry_run_deletes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("a.bin"), [1u8, 2, 3]).unwrap();
    fs::write(root.join("b.bin"), [1u8, 2, 3]).unwrap();
    fs::write(root.join("c.bin"), [1u8, 2, 3]).unwrap();

    let config = DedupConfig::builder()
        .delete_mode(DeleteMode::DryRun)
        .build()
        .unwrap();
    let report = Deduplicator::with_config(config).deduplicate(root).unwrap();

    assert_eq!(report.delete_mode, DeleteMode::DryRun);
    assert_eq!(report.duplicate_count(), 2);
    assert_eq!(report.bytes_reclaimed, 6);
    assert_eq!(count_files(root), 3);
}

#[test]
fn test_excluded_files_are_untouched() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("a.txt"), "dup").unwrap();
    fs::write(root.join("b.keep"), "dup").unwrap();

    let config = DedupConfig::builder()
        .exclude_patterns(vec!["*.keep".to_string()])
        .build()
        .unwrap();
    let report = Deduplicator::with_config(config).deduplicate(root).unwrap();

    assert_eq!(report.files_scanned, 1);
    assert!(root.join("b.keep").exists());
}

#[test]
fn test_events_follow_traversal_order() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("1.txt"), "x").unwrap();
    fs::write(root.join("2.txt"), "x").unwrap();
    fs::write(root.join("3.txt"), "y").unwrap();

    let mut log = Vec::new();
    let config = DedupConfig::builder()
        .on_error(ErrorPolicy::Skip)
        .build()
        .unwrap();
    Deduplicator::with_config(config)
        .deduplicate_with(root, |event| match event {
            DedupEvent::Kept { path, .. } => log.push(format!("keep {}", name(path))),
            DedupEvent::Removed(dup) => log.push(format!("remove {}", name(&dup.path))),
            DedupEvent::Skipped(w) => log.push(format!("skip {}", name(&w.path))),
        })
        .unwrap();

    assert_eq!(log, vec!["keep 1.txt", "remove 2.txt", "keep 3.txt"]);
}

/// Tree where `c.txt` vanishes after the walk has listed it: keeping `a.txt`
/// deletes its later sibling before it is hashed.
fn vanishing_sibling_run(on_error: ErrorPolicy) -> (TempDir, Result<usize, DedupError>) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();

    fs::write(root.join("a.txt"), "first").unwrap();
    fs::write(root.join("b.txt"), "first").unwrap();
    fs::write(root.join("c.txt"), "third").unwrap();
    fs::write(root.join("d.txt"), "first").unwrap();

    let config = DedupConfig::builder().on_error(on_error).build().unwrap();
    let mut skipped = 0;
    let result = Deduplicator::with_config(config)
        .deduplicate_with(&root, |event| match event {
            DedupEvent::Kept { path, .. } if path.ends_with("a.txt") => {
                fs::remove_file(root.join("c.txt")).unwrap();
            }
            DedupEvent::Skipped(_) => skipped += 1,
            _ => {}
        })
        .map(|report| {
            assert_eq!(report.warnings.len(), skipped);
            report.warnings.len()
        });
    (temp, result)
}

#[test]
fn test_skip_policy_continues_past_vanished_file() {
    let (temp, result) = vanishing_sibling_run(ErrorPolicy::Skip);
    assert_eq!(result.unwrap(), 1);

    let root = temp.path();
    assert!(root.join("a.txt").exists());
    assert!(!root.join("b.txt").exists());
    // The walk went on after the skipped file and still removed d.txt.
    assert!(!root.join("d.txt").exists());
}

#[test]
fn test_skip_policy_warning_names_vanished_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    fs::write(root.join("a.txt"), "one").unwrap();
    fs::write(root.join("b.txt"), "two").unwrap();

    let config = DedupConfig::builder()
        .on_error(ErrorPolicy::Skip)
        .build()
        .unwrap();
    let report = Deduplicator::with_config(config)
        .deduplicate_with(&root, |event| {
            if matches!(event, DedupEvent::Kept { path, .. } if path.ends_with("a.txt")) {
                fs::remove_file(root.join("b.txt")).unwrap();
            }
        })
        .unwrap();

    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].path, root.join("b.txt"));
    assert_eq!(report.warnings[0].kind, WarningKind::ReadError);
}

#[test]
fn test_abort_policy_stops_at_vanished_file() {
    let (temp, result) = vanishing_sibling_run(ErrorPolicy::Abort);
    assert!(matches!(result, Err(DedupError::NotFound { .. })));

    let root = temp.path();
    // b.txt was handled before the failure; d.txt was never reached.
    assert!(!root.join("b.txt").exists());
    assert!(root.join("d.txt").exists());
}

#[test]
fn test_trash_mode_moves_duplicate_out_of_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(root.join("keep.bin"), [7u8; 64]).unwrap();
    fs::write(root.join("twin.bin"), [7u8; 64]).unwrap();

    let config = DedupConfig::builder()
        .delete_mode(DeleteMode::Trash)
        .build()
        .unwrap();
    let report = Deduplicator::with_config(config).deduplicate(root).unwrap();

    assert_eq!(report.delete_mode, DeleteMode::Trash);
    assert_eq!(report.duplicate_count(), 1);
    assert_eq!(report.bytes_reclaimed, 64);
    assert!(root.join("keep.bin").exists());
    assert!(!root.join("twin.bin").exists());
}

#[test]
fn test_missing_root_is_error() {
    let temp = TempDir::new().unwrap();
    assert!(deduplicate(&temp.path().join("nope")).is_err());
}

#[test]
fn test_hash_stable_across_runs() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("photo.raw");
    fs::write(&path, vec![42u8; 100_000]).unwrap();

    let (first, _) = hash_file(&path).unwrap();
    let (second, _) = hash_file(&path).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_hex(), second.to_hex());
}

fn name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}
