use std::path::Path;

use async_trait::async_trait;

/// Duration probing of a media file, in seconds of its first audio stream.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe failed: {0}")]
    ProbeFailed(String),
    #[error("no audio stream: {0}")]
    NoAudioStream(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
