use std::path::Path;

use async_trait::async_trait;

use crate::domain::Segment;

/// Writes a human-readable rendition of a transcript next to the record.
#[async_trait]
pub trait TranscriptExporter: Send + Sync {
    async fn export(&self, path: &Path, segments: &[Segment]) -> Result<(), ExportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export failed: {0}")]
    WriteFailed(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
