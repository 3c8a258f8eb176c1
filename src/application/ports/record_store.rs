use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{AudioFileRef, Segment, TranscriptRecord};

/// Persistence of per-recording sidecar records.
///
/// The store exclusively owns the on-disk representation. Every mutating
/// operation is a full read-modify-write cycle serialized per sidecar and
/// made visible atomically: after a crash the previous valid document is
/// still there, never a truncated one.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Deterministic sidecar location for a recording: audio file stem plus
    /// `.json`, in the audio file's directory or in the configured
    /// destination directory.
    fn locate(&self, audio: &AudioFileRef) -> PathBuf;

    async fn exists(&self, audio: &AudioFileRef) -> bool;

    /// Persist a freshly built record. Fails with `AlreadyExists` if a
    /// sidecar is already present; creation never silently overwrites.
    async fn create(
        &self,
        audio: &AudioFileRef,
        record: &TranscriptRecord,
    ) -> Result<(), RecordStoreError>;

    /// Unconditional write, used by forced re-transcription.
    async fn replace(
        &self,
        audio: &AudioFileRef,
        record: &TranscriptRecord,
    ) -> Result<(), RecordStoreError>;

    async fn read(&self, audio: &AudioFileRef) -> Result<TranscriptRecord, RecordStoreError>;

    /// The raw sidecar document, validated but with unknown keys intact.
    async fn read_document(&self, audio: &AudioFileRef) -> Result<Value, RecordStoreError>;

    /// Replace only the `transcript` field; never creates a record.
    async fn update_transcript(
        &self,
        audio: &AudioFileRef,
        new_segments: &[Segment],
    ) -> Result<(), RecordStoreError>;

    /// Append one value to `annotations`, initializing the array if absent;
    /// never creates a record.
    async fn append_annotation(
        &self,
        audio: &AudioFileRef,
        value: Value,
    ) -> Result<(), RecordStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record already exists: {0}")]
    AlreadyExists(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
