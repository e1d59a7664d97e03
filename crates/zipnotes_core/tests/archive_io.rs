use std::path::Path;
use tempfile::TempDir;
use zipnotes_core::{ArchiveError, EntryArchive, ZipArchiveFile};

const PATTERNS: [&str; 2] = [
    "Test Pattern\n\r\noNe!",
    "This\tis\r '\x0b' a\r\n\t\t\ttest!",
];

fn archive_in(dir: &TempDir) -> ZipArchiveFile {
    ZipArchiveFile::new(dir.path().join("Enigma.zip"))
}

fn stray_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != "Enigma.zip")
        .collect()
}

#[test]
fn archive_first_creates_single_entry() {
    let dir = tempfile::tempdir().unwrap();
    let archive = archive_in(&dir);
    assert!(!archive.exists());

    archive.archive_first(PATTERNS[0], "MyFile.dat", false).unwrap();

    assert!(archive.exists());
    assert_eq!(archive.list().unwrap(), vec!["MyFile.dat"]);
    assert_eq!(archive.read_entry("MyFile.dat").unwrap(), PATTERNS[0]);
    assert!(stray_files(dir.path()).is_empty());
}

#[test]
fn archive_first_refuses_to_overwrite_unless_forced() {
    let dir = tempfile::tempdir().unwrap();
    let archive = archive_in(&dir);
    archive.archive_first(PATTERNS[0], "MyFile.dat", false).unwrap();
    let before = std::fs::read(archive.path()).unwrap();

    let err = archive
        .archive_first(PATTERNS[1], "MyFile.dat", false)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::AlreadyExists(_)));
    assert!(err.is_refusal());
    assert_eq!(std::fs::read(archive.path()).unwrap(), before);
    assert_eq!(archive.read_entry("MyFile.dat").unwrap(), PATTERNS[0]);

    archive.archive_first(PATTERNS[1], "Other.dat", true).unwrap();
    assert_eq!(archive.list().unwrap(), vec!["Other.dat"]);
    assert_eq!(archive.read_entry("Other.dat").unwrap(), PATTERNS[1]);
}

#[test]
fn destroy_removes_archive_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let archive = archive_in(&dir);
    archive.destroy().unwrap();

    archive.archive_first(PATTERNS[0], "MyFile.dat", false).unwrap();
    archive.destroy().unwrap();

    assert!(!archive.exists());
    assert!(matches!(
        archive.read_entry("MyFile.dat"),
        Err(ArchiveError::Missing(_))
    ));
    assert!(matches!(archive.list(), Err(ArchiveError::Missing(_))));
    archive.destroy().unwrap();
}

#[test]
fn archive_next_grows_entry_list_by_one() {
    let dir = tempfile::tempdir().unwrap();
    let archive = archive_in(&dir);
    archive.archive_first(PATTERNS[0], "MyFile.dat", false).unwrap();

    let names = ["One.TXT", "Two.bin", "3next", "4545.654.322"];
    for (expected_len, name) in (2..).zip(names) {
        archive.archive_next(PATTERNS[1], name).unwrap();
        assert_eq!(archive.read_entry(name).unwrap(), PATTERNS[1]);
        assert_eq!(archive.list().unwrap().len(), expected_len);
        assert!(archive.exists());
    }

    let mut expected = vec!["MyFile.dat"];
    expected.extend(names);
    assert_eq!(archive.list().unwrap(), expected);
    assert_eq!(archive.read_entry("MyFile.dat").unwrap(), PATTERNS[0]);
    assert!(stray_files(dir.path()).is_empty());
}

#[test]
fn archive_next_requires_existing_archive() {
    let dir = tempfile::tempdir().unwrap();
    let archive = archive_in(&dir);

    let err = archive.archive_next(PATTERNS[0], "One.TXT").unwrap_err();
    assert!(matches!(err, ArchiveError::Missing(_)));
    assert!(!archive.exists());
}

#[test]
fn archive_next_refuses_duplicate_names_without_change() {
    let dir = tempfile::tempdir().unwrap();
    let archive = archive_in(&dir);
    archive.archive_first(PATTERNS[0], "MyFile.dat", false).unwrap();
    let before = std::fs::read(archive.path()).unwrap();

    let err = archive.archive_next(PATTERNS[1], "MyFile.dat").unwrap_err();
    assert!(matches!(err, ArchiveError::DuplicateEntry(name) if name == "MyFile.dat"));
    assert_eq!(std::fs::read(archive.path()).unwrap(), before);
}

#[test]
fn blank_entry_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let archive = archive_in(&dir);

    let err = archive.archive_first(PATTERNS[0], "", false).unwrap_err();
    assert!(matches!(err, ArchiveError::InvalidEntryName(_)));
    assert!(!archive.exists());
}

#[test]
fn reading_unknown_entry_reports_entry_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let archive = archive_in(&dir);
    archive.archive_first(PATTERNS[0], "MyFile.dat", false).unwrap();

    assert!(matches!(
        archive.read_entry("nope.txt"),
        Err(ArchiveError::EntryNotFound(name)) if name == "nope.txt"
    ));
}

#[test]
fn payloads_keep_non_ascii_text() {
    let dir = tempfile::tempdir().unwrap();
    let archive = archive_in(&dir);
    let payload = "Grüße, 世界 🌍\n";

    archive.archive_first(payload, "unicode.txt", false).unwrap();
    assert_eq!(archive.read_entry("unicode.txt").unwrap(), payload);
}

#[test]
fn archive_in_missing_directory_fails_as_io() {
    let dir = tempfile::tempdir().unwrap();
    let archive = ZipArchiveFile::new(dir.path().join("absent").join("Enigma.zip"));

    let err = archive
        .archive_first(PATTERNS[0], "MyFile.dat", false)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Io(_)));
    assert!(!err.is_refusal());
    assert!(!archive.exists());
}
