/// Fields derived from a recording's filename at ingestion time.
///
/// Extraction never fails: a name the convention cannot parse yields the
/// `"unknown"` date sentinel, no place, and whatever notes text remains.
/// Once attached to a record these fields are never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingMetadata {
    pub date: String,
    pub place: Option<String>,
    pub notes: String,
}

pub const UNKNOWN_DATE: &str = "unknown";

impl RecordingMetadata {
    pub fn new(date: impl Into<String>, place: Option<String>, notes: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            place,
            notes: notes.into(),
        }
    }

    /// Metadata for a filename no convention could parse.
    pub fn unknown() -> Self {
        Self {
            date: UNKNOWN_DATE.to_string(),
            place: None,
            notes: String::new(),
        }
    }
}
