use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::application::ports::{DecodeOptions, TranscriptionEngine, TranscriptionError};
use crate::domain::Segment;

/// Engine that spawns the `whisper` CLI and parses the JSON file it emits.
///
/// The CLI writes `{stem}.json` into `--output_dir`; we point that at a
/// scratch directory so nothing the CLI produces lands in the library.
pub struct WhisperCliEngine {
    binary: String,
    model: String,
}

#[derive(Deserialize)]
struct WhisperOutput {
    segments: Vec<WhisperSegment>,
}

#[derive(Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

impl WhisperCliEngine {
    pub fn new(binary: Option<String>, model: impl Into<String>) -> Self {
        Self {
            binary: binary.unwrap_or_else(|| "whisper".to_string()),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for WhisperCliEngine {
    async fn transcribe(
        &self,
        audio_path: &Path,
        options: &DecodeOptions,
    ) -> Result<Vec<Segment>, TranscriptionError> {
        let scratch = tempfile::tempdir()
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("scratch dir: {}", e)))?;

        tracing::debug!(
            binary = %self.binary,
            model = %self.model,
            file = %audio_path.display(),
            "Spawning whisper CLI"
        );

        let output = Command::new(&self.binary)
            .arg(audio_path)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_format")
            .arg("json")
            .arg("--output_dir")
            .arg(scratch.path())
            .arg("--temperature")
            .arg(options.temperature.to_string())
            .arg("--beam_size")
            .arg(options.beam_size.to_string())
            .arg("--fp16")
            .arg(if options.fp16 { "True" } else { "False" })
            .output()
            .await
            .map_err(|e| {
                TranscriptionError::ModelLoadFailed(format!("spawn {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptionError::TranscriptionFailed(format!(
                "{}: {}",
                audio_path.display(),
                stderr.trim()
            )));
        }

        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                TranscriptionError::TranscriptionFailed(format!(
                    "no file stem: {}",
                    audio_path.display()
                ))
            })?;
        let result_path = scratch.path().join(format!("{}.json", stem));
        let bytes = tokio::fs::read(&result_path).await.map_err(|e| {
            TranscriptionError::OutputParseFailed(format!(
                "missing engine output {}: {}",
                result_path.display(),
                e
            ))
        })?;

        let parsed: WhisperOutput = serde_json::from_slice(&bytes)
            .map_err(|e| TranscriptionError::OutputParseFailed(format!("json: {}", e)))?;

        let segments = parsed
            .segments
            .into_iter()
            .map(|s| Segment::new(s.start, s.end, s.text))
            .collect::<Vec<_>>();

        tracing::info!(
            segments = segments.len(),
            file = %audio_path.display(),
            "Whisper CLI transcription completed"
        );

        Ok(segments)
    }
}
