mod audio_file_ref;
mod recording_metadata;
mod segment;
mod transcript_record;

pub use audio_file_ref::{AudioFileRef, InvalidAudioPath};
pub use recording_metadata::{RecordingMetadata, UNKNOWN_DATE};
pub use segment::Segment;
pub use transcript_record::TranscriptRecord;
