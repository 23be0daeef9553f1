//! Script files run end to end against a capacity-3 tree.

use btree_memory::{BTree, BTreeError, Outcome, Script};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_script(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_script_file_round_trip() {
    let file = write_script(
        "i 1\ni 3\ni 2\ni 6\ni 4\ni 7\ni 5\n\
         d 6\nd 4\nd 2\nd 5\nd 1\nd 3\nd 7\n\
         i 1\ni 3\ni 2\ni 6\ni 4\ni 7\ni 5\n\
         d 8\ni 8\nd 8\ns 7\n",
    );

    let script = Script::from_path(file.path()).unwrap();
    assert_eq!(script.len(), 25);

    let mut tree = BTree::with_capacity(3).unwrap();
    let report = script.run(&mut tree).unwrap();

    assert_eq!(report.keys, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(report.not_found(), 1);
    assert_eq!(report.steps[21].outcome, Outcome::NotFound);
    assert_eq!(report.steps[24].outcome, Outcome::Found);
    tree.validate().unwrap();
}

#[test]
fn test_script_continues_past_empty_tree() {
    let file = write_script("d 5\ns 5\ni 5\ns 5\n");
    let script = Script::from_path(file.path()).unwrap();

    let mut tree = BTree::new();
    let report = script.run(&mut tree).unwrap();
    let outcomes: Vec<Outcome> = report.steps.iter().map(|s| s.outcome).collect();

    assert_eq!(
        outcomes,
        vec![
            Outcome::EmptyTree,
            Outcome::EmptyTree,
            Outcome::Inserted,
            Outcome::Found
        ]
    );
    assert_eq!(report.keys, vec![5]);
}

#[test]
fn test_missing_script_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Script::from_path(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, BTreeError::Io(_)));
}

#[test]
fn test_bad_script_line() {
    let file = write_script("i 1\nq 2\n");
    let err = Script::from_path(file.path()).unwrap_err();
    assert!(matches!(err, BTreeError::Parse { line: 2, .. }));
}
