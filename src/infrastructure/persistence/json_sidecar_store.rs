use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::application::ports::{RecordStore, RecordStoreError};
use crate::domain::{AudioFileRef, Segment, TranscriptRecord};

/// Filesystem record store: one JSON sidecar per recording, living next to
/// the audio file (or flattened into a configured destination directory).
///
/// Writes go to a sibling temp file that is atomically renamed over the
/// sidecar, so a crash mid-write leaves the previous document intact. Each
/// read-modify-write cycle holds a per-sidecar-path mutex; concurrent
/// writers to the same record serialize into last-writer-wins, never into
/// interleaved bytes. Mutations edit the parsed document rather than a
/// typed struct, so keys this crate does not know about survive updates.
pub struct JsonSidecarStore {
    destination: Option<PathBuf>,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl JsonSidecarStore {
    pub fn new() -> Self {
        Self {
            destination: None,
            locks: DashMap::new(),
        }
    }

    /// Sidecars (and exports) land flattened into `destination` instead of
    /// next to their audio files.
    pub fn with_destination(destination: PathBuf) -> Self {
        Self {
            destination: Some(destination),
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_valid(&self, audio: &AudioFileRef) -> Result<Value, RecordStoreError> {
        let path = self.locate(audio);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecordStoreError::NotFound(audio.rel_path().to_string()));
            }
            Err(e) => return Err(RecordStoreError::Io(e)),
        };
        let doc: Value = serde_json::from_slice(&bytes)
            .map_err(|e| RecordStoreError::Corrupt(format!("invalid json: {}", e)))?;
        TranscriptRecord::from_document(&doc).map_err(RecordStoreError::Corrupt)?;
        Ok(doc)
    }

    async fn write_atomic(&self, path: &Path, doc: &Value) -> Result<(), RecordStoreError> {
        let parent = path
            .parent()
            .ok_or_else(|| {
                RecordStoreError::WriteFailed(format!("no parent directory: {}", path.display()))
            })?
            .to_path_buf();
        tokio::fs::create_dir_all(&parent).await?;

        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| RecordStoreError::WriteFailed(format!("serialize: {}", e)))?;
        let target = path.to_path_buf();

        // Temp file must live in the sidecar's own directory so the final
        // rename stays on one filesystem and is atomic.
        tokio::task::spawn_blocking(move || -> Result<(), RecordStoreError> {
            let mut tmp = tempfile::NamedTempFile::new_in(&parent)
                .map_err(|e| RecordStoreError::WriteFailed(format!("temp file: {}", e)))?;
            tmp.write_all(&bytes)
                .map_err(|e| RecordStoreError::WriteFailed(format!("write: {}", e)))?;
            tmp.flush()
                .map_err(|e| RecordStoreError::WriteFailed(format!("flush: {}", e)))?;
            tmp.persist(&target)
                .map_err(|e| RecordStoreError::WriteFailed(format!("rename: {}", e)))?;
            Ok(())
        })
        .await
        .map_err(|e| RecordStoreError::WriteFailed(format!("write task: {}", e)))?
    }
}

impl Default for JsonSidecarStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for JsonSidecarStore {
    fn locate(&self, audio: &AudioFileRef) -> PathBuf {
        match &self.destination {
            Some(dir) => dir.join(format!("{}.json", audio.file_stem())),
            None => audio.abs_path().with_extension("json"),
        }
    }

    async fn exists(&self, audio: &AudioFileRef) -> bool {
        tokio::fs::try_exists(self.locate(audio))
            .await
            .unwrap_or(false)
    }

    async fn create(
        &self,
        audio: &AudioFileRef,
        record: &TranscriptRecord,
    ) -> Result<(), RecordStoreError> {
        let path = self.locate(audio);
        let lock = self.lock_for(&path);
        let _guard = lock.lock().await;

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(RecordStoreError::AlreadyExists(
                audio.rel_path().to_string(),
            ));
        }
        self.write_atomic(&path, &record.to_document()).await
    }

    async fn replace(
        &self,
        audio: &AudioFileRef,
        record: &TranscriptRecord,
    ) -> Result<(), RecordStoreError> {
        let path = self.locate(audio);
        let lock = self.lock_for(&path);
        let _guard = lock.lock().await;

        self.write_atomic(&path, &record.to_document()).await
    }

    async fn read(&self, audio: &AudioFileRef) -> Result<TranscriptRecord, RecordStoreError> {
        let doc = self.load_valid(audio).await?;
        TranscriptRecord::from_document(&doc).map_err(RecordStoreError::Corrupt)
    }

    async fn read_document(&self, audio: &AudioFileRef) -> Result<Value, RecordStoreError> {
        self.load_valid(audio).await
    }

    async fn update_transcript(
        &self,
        audio: &AudioFileRef,
        new_segments: &[Segment],
    ) -> Result<(), RecordStoreError> {
        let path = self.locate(audio);
        let lock = self.lock_for(&path);
        let _guard = lock.lock().await;

        let mut doc = self.load_valid(audio).await?;
        doc["transcript"] = serde_json::to_value(new_segments)
            .map_err(|e| RecordStoreError::WriteFailed(format!("serialize transcript: {}", e)))?;
        self.write_atomic(&path, &doc).await
    }

    async fn append_annotation(
        &self,
        audio: &AudioFileRef,
        value: Value,
    ) -> Result<(), RecordStoreError> {
        let path = self.locate(audio);
        let lock = self.lock_for(&path);
        let _guard = lock.lock().await;

        let mut doc = self.load_valid(audio).await?;
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| RecordStoreError::Corrupt("document is not a JSON object".to_string()))?;
        match obj
            .entry("annotations".to_string())
            .or_insert_with(|| json!([]))
        {
            Value::Array(items) => items.push(value),
            _ => {
                return Err(RecordStoreError::Corrupt(
                    "non-array key: annotations".to_string(),
                ));
            }
        }
        self.write_atomic(&path, &doc).await
    }
}
