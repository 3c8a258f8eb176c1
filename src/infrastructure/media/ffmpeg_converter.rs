use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{ConversionError, ConversionSpec, FormatConverter};

/// Codec conversion backed by the `ffmpeg` binary.
pub struct FfmpegConverter {
    binary: String,
}

impl FfmpegConverter {
    pub fn new() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FormatConverter for FfmpegConverter {
    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        spec: &ConversionSpec,
    ) -> Result<(), ConversionError> {
        let result = Command::new(&self.binary)
            .arg("-i")
            .arg(input)
            .arg("-acodec")
            .arg(&spec.codec)
            .arg("-ar")
            .arg(spec.sample_rate.to_string())
            .arg("-y")
            .arg(output)
            .output()
            .await
            .map_err(|e| ConversionError::ConversionFailed(format!("spawn {}: {}", self.binary, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ConversionError::ConversionFailed(format!(
                "{} -> {}: {}",
                input.display(),
                output.display(),
                stderr.trim()
            )));
        }

        tracing::info!(
            from = %input.display(),
            to = %output.display(),
            codec = %spec.codec,
            sample_rate = spec.sample_rate,
            "Conversion completed"
        );

        Ok(())
    }
}
