mod filename_metadata_extractor;
mod format_converter;
mod media_probe;
mod record_store;
mod transcript_exporter;
mod transcription_engine;

pub use filename_metadata_extractor::FilenameMetadataExtractor;
pub use format_converter::{ConversionError, ConversionSpec, FormatConverter};
pub use media_probe::{MediaProbe, ProbeError};
pub use record_store::{RecordStore, RecordStoreError};
pub use transcript_exporter::{ExportError, TranscriptExporter};
pub use transcription_engine::{DecodeOptions, TranscriptionEngine, TranscriptionError};
