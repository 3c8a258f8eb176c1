mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    LibrarySettings, LoggingSettings, ServerSettings, Settings, TranscriptionSettings,
};
