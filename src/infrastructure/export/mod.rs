mod text_transcript_writer;

pub use text_transcript_writer::TextTranscriptWriter;
