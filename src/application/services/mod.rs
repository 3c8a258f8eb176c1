mod library_scanner;
mod transcription_orchestrator;

pub use library_scanner::{
    CorruptSidecar, DEFAULT_AUDIO_EXTENSIONS, LibraryScanner, ScanError, ScanReport,
};
pub use transcription_orchestrator::{
    BatchReport, OrchestratorConfig, TranscriptionJobError, TranscriptionOrchestrator,
};
