use crate::domain::RecordingMetadata;

/// Derives structured metadata from a bare filename (no directory part).
///
/// Multiple incompatible naming conventions coexist in real libraries, so
/// the convention is a strategy selected per ingestion batch. Extraction is
/// a pure function and never fails: unparseable names get sentinel values.
pub trait FilenameMetadataExtractor: Send + Sync {
    fn extract(&self, filename: &str) -> RecordingMetadata;
}
