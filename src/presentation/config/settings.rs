use std::path::PathBuf;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::infrastructure::naming::NamingConvention;
use crate::infrastructure::transcription::TranscriptionProvider;

/// Full configuration tree, loaded from an optional `skrivari.toml` plus
/// `SKRIVARI_`-prefixed environment overrides (`SKRIVARI_SERVER__PORT` and
/// so on). CLI flags override both.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub library: LibrarySettings,
    pub transcription: TranscriptionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibrarySettings {
    /// Root of the recording tree to scan and serve.
    pub root: PathBuf,
    /// When set, sidecars and text exports land flattened in this directory
    /// instead of next to their audio files.
    pub destination: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub convention: NamingConvention,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub provider: TranscriptionProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Override for the whisper CLI binary name.
    pub binary: Option<String>,
    pub temperature: f32,
    pub beam_size: u32,
    pub fp16: bool,
    /// Per-file ceiling in minutes; absent means no ceiling.
    pub timeout_minutes: Option<u64>,
    pub workers: usize,
    /// Minutes of audio transcribed per minute of wall time, for the
    /// expected-completion estimate.
    pub realtime_factor: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("library.root", ".")?
            .set_default(
                "library.extensions",
                vec!["wav", "mp3", "flac", "aac", "ogg", "m4a", "aiff"],
            )?
            .set_default("library.convention", "stereo_mix")?
            .set_default("transcription.provider", "cli")?
            .set_default("transcription.model", "medium")?
            .set_default("transcription.temperature", 0.2)?
            .set_default("transcription.beam_size", 5)?
            .set_default("transcription.fp16", false)?
            .set_default("transcription.workers", 1)?
            .set_default("transcription.realtime_factor", 5.642)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .add_source(File::with_name("skrivari").required(false))
            .add_source(
                config::Environment::with_prefix("SKRIVARI")
                    .separator("__")
                    .list_separator(" "),
            )
            .build()?
            .try_deserialize()
    }
}
