use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{DecodeOptions, TranscriptionEngine, TranscriptionError};
use crate::domain::Segment;

/// Engine backed by the OpenAI Whisper API (`verbose_json` response so the
/// segment timings come back with the text).
pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct VerboseTranscription {
    segments: Vec<VerboseSegment>,
}

#[derive(Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    text: String,
}

impl OpenAiWhisperEngine {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: model.unwrap_or_else(|| "whisper-1".to_string()),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    async fn transcribe(
        &self,
        audio_path: &Path,
        options: &DecodeOptions,
    ) -> Result<Vec<Segment>, TranscriptionError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let audio_data = tokio::fs::read(audio_path)
            .await
            .map_err(|e| TranscriptionError::TranscriptionFailed(format!("read audio: {}", e)))?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.wav".to_string());

        let file_part = multipart::Part::bytes(audio_data)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("temperature", options.temperature.to_string())
            .part("file", file_part);

        tracing::debug!(model = %self.model, file = %audio_path.display(), "Sending audio to OpenAI Whisper API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| TranscriptionError::OutputParseFailed(format!("body: {}", e)))?;

        let segments = parsed
            .segments
            .into_iter()
            .map(|s| Segment::new(s.start, s.end, s.text))
            .collect::<Vec<_>>();

        tracing::info!(
            segments = segments.len(),
            "OpenAI Whisper transcription completed"
        );

        Ok(segments)
    }
}
