use zipnotes_core::{
    ArchiveError, EntryArchive, FieldValue, FixedClock, NoteService, ServiceError,
    ZipArchiveFile, NOTES_ENTRY,
};

fn service_in(dir: &tempfile::TempDir) -> NoteService<ZipArchiveFile, FixedClock> {
    NoteService::new(
        ZipArchiveFile::new(dir.path().join("notes.zip")),
        FixedClock(1_234_567_890),
    )
}

#[test]
fn load_without_archive_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);

    let collection = service.load().unwrap();
    assert_eq!(collection.len_keys(), 0);
    assert!(!service.archive().exists());
    assert!(service.attachments().unwrap().is_empty());
}

#[test]
fn save_then_load_round_trips_live_notes() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let mut collection = service.load().unwrap();

    let keep = {
        let record = collection.create(service.clock()).unwrap();
        record.set_subject("keep me");
        record.set("priority", 2).unwrap();
        record.id()
    };
    let drop = collection.create(service.clock()).unwrap().id();
    collection.delete(drop).unwrap();

    service.save(&collection).unwrap();
    assert_eq!(service.archive().list().unwrap(), vec![NOTES_ENTRY]);

    let loaded = service.load().unwrap();
    assert_eq!(loaded.count(), 1);
    assert_eq!(loaded.count_deleted(), 0);
    let record = loaded.lookup(keep).unwrap();
    assert_eq!(record.subject(), "keep me");
    assert_eq!(record.get("priority").as_deref(), Some(&FieldValue::Integer(2)));
    assert!(loaded.lookup(drop).is_none());
}

#[test]
fn saving_again_replaces_note_list_and_keeps_attachments() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let mut collection = service.load().unwrap();
    collection.create(service.clock()).unwrap().set_subject("first");
    service.save(&collection).unwrap();

    service.attach("readme.txt", "hello").unwrap();
    service.attach("todo.txt", "- ship").unwrap();

    collection.create(service.clock()).unwrap().set_subject("second");
    service.save(&collection).unwrap();

    assert_eq!(
        service.archive().list().unwrap(),
        vec![NOTES_ENTRY, "readme.txt", "todo.txt"]
    );
    assert_eq!(service.attachment("todo.txt").unwrap(), "- ship");
    assert_eq!(service.load().unwrap().count(), 2);
}

#[test]
fn attach_refuses_note_list_name_and_missing_archive() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);

    assert!(matches!(
        service.attach(NOTES_ENTRY, "x"),
        Err(ServiceError::ReservedEntry(_))
    ));
    assert!(matches!(
        service.attach("readme.txt", "x"),
        Err(ServiceError::Archive(ArchiveError::Missing(_)))
    ));
    assert!(matches!(
        service.attachment(NOTES_ENTRY),
        Err(ServiceError::ReservedEntry(_))
    ));
}

#[test]
fn corrupt_note_list_surfaces_codec_error() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    service
        .archive()
        .archive_first("[\"{not json\"]", NOTES_ENTRY, false)
        .unwrap();

    assert!(matches!(service.load(), Err(ServiceError::Codec(_))));
}

#[test]
fn archive_without_note_list_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    service
        .archive()
        .archive_first("stray", "other.txt", false)
        .unwrap();

    assert!(matches!(
        service.load(),
        Err(ServiceError::Archive(ArchiveError::EntryNotFound(_)))
    ));
}

#[test]
fn clone_note_copies_fields_under_new_identity() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let mut collection = service.load().unwrap();
    let source = {
        let record = collection.create(&FixedClock(1)).unwrap();
        record.set_subject("original");
        record.set_data("body");
        record.set("mood", "calm").unwrap();
        record.clone()
    };

    let copy = service.clone_note(&source);

    assert_ne!(copy.id(), source.id());
    assert_eq!(copy.time(), 1_234_567_890);
    assert_eq!(copy.subject(), "original");
    assert_eq!(copy.data(), "body");
    assert_eq!(copy.get("mood").as_deref(), Some(&FieldValue::from("calm")));

    collection.append(copy, true).unwrap();
    assert_eq!(collection.count(), 2);
}
