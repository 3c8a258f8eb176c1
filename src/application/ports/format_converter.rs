use std::path::Path;

use async_trait::async_trait;

/// Target codec and sample rate for a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSpec {
    pub codec: String,
    pub sample_rate: u32,
}

impl Default for ConversionSpec {
    fn default() -> Self {
        // 16 kHz PCM; the speech model resamples to 16 kHz anyway.
        Self {
            codec: "pcm_s16le".to_string(),
            sample_rate: 16_000,
        }
    }
}

/// Conversion of a recording into the canonical container/codec. Failures
/// are reported to the caller and never retried here.
#[async_trait]
pub trait FormatConverter: Send + Sync {
    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        spec: &ConversionSpec,
    ) -> Result<(), ConversionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("conversion failed: {0}")]
    ConversionFailed(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
