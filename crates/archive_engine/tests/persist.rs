use std::fs;

use archive_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_nested_dirs() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("Bob").join("2023").join("11");
    assert!(!nested.exists());
    ensure_output_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("config.json", "hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "config.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("config.json", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn binary_payloads_are_written_verbatim() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("photo"));
    let bytes = [0u8, 159, 146, 150, 255];

    let path = writer.write("a.jpg", bytes).unwrap();
    assert_eq!(fs::read(path).unwrap(), bytes);
}

#[test]
fn no_partial_file_when_target_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("post.md", "data").is_err());
    assert!(!file_path.with_file_name("post.md").exists());
}
