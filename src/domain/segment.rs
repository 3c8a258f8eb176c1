use serde::{Deserialize, Serialize};

/// One timed utterance within a transcript.
///
/// `start`/`end` are seconds from the beginning of the recording. Segments
/// are expected to arrive ordered by `start` from the producing engine; the
/// store does not re-sort or police that ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}
