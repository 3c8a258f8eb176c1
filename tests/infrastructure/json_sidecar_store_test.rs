use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use skrivari::application::ports::{RecordStore, RecordStoreError};
use skrivari::domain::{AudioFileRef, RecordingMetadata, Segment, TranscriptRecord};
use skrivari::infrastructure::persistence::JsonSidecarStore;

fn audio_ref(root: &Path, rel: &str) -> AudioFileRef {
    AudioFileRef::new(root, rel, RecordingMetadata::new("20240115", None, "notes")).unwrap()
}

fn sample_record(rel: &str) -> TranscriptRecord {
    TranscriptRecord::from_raw_segments(
        rel,
        2.5,
        RecordingMetadata::new("20240115", None, "notes"),
        vec![Segment::new(0.0, 1.0, " hello")],
    )
}

#[test]
fn given_default_store_when_locating_then_sidecar_sits_next_to_audio() {
    let store = JsonSidecarStore::new();
    let audio = audio_ref(Path::new("/library"), "sub/a.wav");

    assert_eq!(
        store.locate(&audio),
        Path::new("/library/sub/a.json").to_path_buf()
    );
}

#[test]
fn given_destination_override_when_locating_then_sidecar_is_flattened() {
    let store = JsonSidecarStore::with_destination("/out".into());
    let audio = audio_ref(Path::new("/library"), "sub/a.wav");

    assert_eq!(store.locate(&audio), Path::new("/out/a.json").to_path_buf());
}

#[tokio::test]
async fn given_created_record_when_reading_then_round_trips() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.wav"), b"riff").unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    store.create(&audio, &sample_record("a.wav")).await.unwrap();

    assert!(store.exists(&audio).await);
    let read_back = store.read(&audio).await.unwrap();
    assert_eq!(read_back, sample_record("a.wav"));
}

#[tokio::test]
async fn given_existing_sidecar_when_creating_again_then_already_exists() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    store.create(&audio, &sample_record("a.wav")).await.unwrap();
    let err = store.create(&audio, &sample_record("a.wav")).await.unwrap_err();

    assert!(matches!(err, RecordStoreError::AlreadyExists(_)));
}

#[tokio::test]
async fn given_existing_sidecar_when_replacing_then_overwritten() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    store.create(&audio, &sample_record("a.wav")).await.unwrap();
    let regenerated = sample_record("a.wav").merge_transcript_update(vec![Segment::new(
        0.0,
        2.0,
        " regenerated",
    )]);
    store.replace(&audio, &regenerated).await.unwrap();

    assert_eq!(store.read(&audio).await.unwrap(), regenerated);
}

#[tokio::test]
async fn given_no_sidecar_when_reading_then_not_found() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "missing.wav");

    assert!(matches!(
        store.read(&audio).await.unwrap_err(),
        RecordStoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn given_invalid_json_when_reading_then_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.json"), b"{not json").unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    assert!(matches!(
        store.read(&audio).await.unwrap_err(),
        RecordStoreError::Corrupt(_)
    ));
}

#[tokio::test]
async fn given_schema_violating_sidecar_when_reading_then_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.json"), br#"{"duration": "long"}"#).unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    assert!(matches!(
        store.read(&audio).await.unwrap_err(),
        RecordStoreError::Corrupt(_)
    ));
}

#[tokio::test]
async fn given_transcript_update_when_reading_back_then_metadata_preserved() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");
    store.create(&audio, &sample_record("a.wav")).await.unwrap();

    let new_segments = vec![Segment::new(0.0, 1.0, " corrected")];
    store.update_transcript(&audio, &new_segments).await.unwrap();

    let read_back = store.read(&audio).await.unwrap();
    assert_eq!(read_back.transcript, new_segments);
    assert_eq!(read_back.source_path, "a.wav");
    assert_eq!(read_back.duration_minutes, 2.5);
    assert_eq!(read_back.metadata.date, "20240115");
    assert_eq!(read_back.metadata.notes, "notes");
}

#[tokio::test]
async fn given_unknown_keys_in_sidecar_when_updating_then_they_survive() {
    let dir = tempfile::TempDir::new().unwrap();
    let sidecar = dir.path().join("a.json");
    let doc = json!({
        "source_path": "a.wav",
        "duration": 2.5,
        "date": "20240115",
        "notes": "notes",
        "transcript": [],
        "reviewer": "someone else's field"
    });
    std::fs::write(&sidecar, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    store
        .update_transcript(&audio, &[Segment::new(0.0, 1.0, "x")])
        .await
        .unwrap();
    store.append_annotation(&audio, json!("note")).await.unwrap();

    let bytes = std::fs::read(&sidecar).unwrap();
    let updated: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(updated["reviewer"], json!("someone else's field"));
    assert_eq!(updated["annotations"], json!(["note"]));
}

#[tokio::test]
async fn given_no_record_when_updating_transcript_then_not_found_and_nothing_created() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    let err = store
        .update_transcript(&audio, &[Segment::new(0.0, 1.0, "x")])
        .await
        .unwrap_err();

    assert!(matches!(err, RecordStoreError::NotFound(_)));
    assert!(!store.exists(&audio).await);
}

#[tokio::test]
async fn given_no_record_when_appending_annotation_then_not_found() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    assert!(matches!(
        store.append_annotation(&audio, json!("x")).await.unwrap_err(),
        RecordStoreError::NotFound(_)
    ));
}

#[tokio::test]
async fn given_record_without_annotations_when_appending_then_array_initialized() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");
    store.create(&audio, &sample_record("a.wav")).await.unwrap();

    store
        .append_annotation(&audio, json!({"comment": "first"}))
        .await
        .unwrap();

    let read_back = store.read(&audio).await.unwrap();
    assert_eq!(read_back.annotations, vec![json!({"comment": "first"})]);
}

#[tokio::test]
async fn given_concurrent_appends_when_all_finish_then_none_lost() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(JsonSidecarStore::new());
    let audio = audio_ref(dir.path(), "a.wav");
    store.create(&audio, &sample_record("a.wav")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = Arc::clone(&store);
        let audio = audio.clone();
        handles.push(tokio::spawn(async move {
            store.append_annotation(&audio, json!(i)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let read_back = store.read(&audio).await.unwrap();
    assert_eq!(read_back.annotations.len(), 10);
}

#[tokio::test]
async fn given_corrupt_sidecar_when_updating_then_file_left_byte_identical() {
    let dir = tempfile::TempDir::new().unwrap();
    let sidecar = dir.path().join("a.json");
    std::fs::write(&sidecar, b"{truncated").unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    let err = store
        .update_transcript(&audio, &[Segment::new(0.0, 1.0, "x")])
        .await
        .unwrap_err();

    assert!(matches!(err, RecordStoreError::Corrupt(_)));
    assert_eq!(std::fs::read(&sidecar).unwrap(), b"{truncated");
}

#[tokio::test]
async fn given_blocked_destination_when_creating_then_error_and_nothing_written() {
    let dir = tempfile::TempDir::new().unwrap();
    // A regular file where the destination's parent should be makes every
    // step of the write path fail before anything becomes visible.
    let blocker = dir.path().join("out");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = JsonSidecarStore::with_destination(blocker.join("records"));
    let audio = audio_ref(dir.path(), "a.wav");

    let err = store.create(&audio, &sample_record("a.wav")).await.unwrap_err();

    assert!(matches!(
        err,
        RecordStoreError::Io(_) | RecordStoreError::WriteFailed(_)
    ));
    assert!(!store.exists(&audio).await);
    assert_eq!(std::fs::read(&blocker).unwrap(), b"not a directory");
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["out".to_string()]);
}

#[tokio::test]
async fn given_stray_temp_file_from_interrupted_write_when_reading_then_prior_document_served() {
    let dir = tempfile::TempDir::new().unwrap();
    let sidecar = dir.path().join("a.json");
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");
    store.create(&audio, &sample_record("a.wav")).await.unwrap();
    let before = std::fs::read(&sidecar).unwrap();

    // A writer that died between the temp write and the rename leaves a
    // half-written temp file behind and never touches the sidecar itself.
    std::fs::write(
        dir.path().join(".tmpQx3b7n"),
        br#"{"source_path": "a.wav", "durat"#,
    )
    .unwrap();

    assert_eq!(store.read(&audio).await.unwrap(), sample_record("a.wav"));
    assert_eq!(std::fs::read(&sidecar).unwrap(), before);

    // The next full write replaces the document atomically regardless of
    // the leftover.
    store
        .update_transcript(&audio, &[Segment::new(0.0, 1.0, " corrected")])
        .await
        .unwrap();
    let read_back = store.read(&audio).await.unwrap();
    assert_eq!(read_back.transcript, vec![Segment::new(0.0, 1.0, " corrected")]);
    assert_eq!(read_back.duration_minutes, 2.5);
}

#[tokio::test]
async fn given_completed_writes_when_listing_directory_then_no_temp_files_remain() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = JsonSidecarStore::new();
    let audio = audio_ref(dir.path(), "a.wav");

    store.create(&audio, &sample_record("a.wav")).await.unwrap();
    store
        .update_transcript(&audio, &[Segment::new(0.0, 1.0, "x")])
        .await
        .unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.json".to_string()]);
}

#[tokio::test]
async fn given_destination_store_when_creating_then_directory_is_created() {
    let dir = tempfile::TempDir::new().unwrap();
    let destination = dir.path().join("out/records");
    let store = JsonSidecarStore::with_destination(destination.clone());
    let audio = audio_ref(dir.path(), "sub/a.wav");

    store.create(&audio, &sample_record("sub/a.wav")).await.unwrap();

    assert!(destination.join("a.json").is_file());
}
