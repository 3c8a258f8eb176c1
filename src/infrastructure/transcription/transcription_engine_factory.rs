use std::sync::Arc;

use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

use super::openai_whisper_engine::OpenAiWhisperEngine;
use super::whisper_cli_engine::WhisperCliEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    Cli,
    #[serde(rename = "openai")]
    OpenAi,
}

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    pub fn create(
        provider: TranscriptionProvider,
        model: &str,
        api_key: Option<String>,
        base_url: Option<String>,
        binary: Option<String>,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        match provider {
            TranscriptionProvider::Cli => Ok(Arc::new(WhisperCliEngine::new(binary, model))),
            TranscriptionProvider::OpenAi => {
                let key = api_key.ok_or_else(|| {
                    TranscriptionError::ModelLoadFailed(
                        "API key required for OpenAI Whisper".to_string(),
                    )
                })?;
                let engine = OpenAiWhisperEngine::new(key, base_url, Some(model.to_string()));
                Ok(Arc::new(engine))
            }
        }
    }
}
