use std::path::Path;

use async_trait::async_trait;

use crate::domain::Segment;

/// Decoding parameters forwarded to the speech model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOptions {
    pub temperature: f32,
    pub beam_size: u32,
    pub fp16: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            beam_size: 5,
            fp16: false,
        }
    }
}

/// External speech-recognition engine. A black box: any failure is fatal
/// for the single file being transcribed, not for the batch.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(
        &self,
        audio_path: &Path,
        options: &DecodeOptions,
    ) -> Result<Vec<Segment>, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("engine output unreadable: {0}")]
    OutputParseFailed(String),
}
