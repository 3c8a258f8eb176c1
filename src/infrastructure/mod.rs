pub mod export;
pub mod media;
pub mod naming;
pub mod observability;
pub mod persistence;
pub mod transcription;
