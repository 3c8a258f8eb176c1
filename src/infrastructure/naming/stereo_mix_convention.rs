use crate::application::ports::FilenameMetadataExtractor;
use crate::domain::{RecordingMetadata, UNKNOWN_DATE};

use super::date_prefix::{leading_date, strip_extension};

/// Convention for stereo-mixdown batches: `{date}-{notes}_mixed_stereo.wav`.
///
/// Notes are whatever sits between the date prefix and the
/// `_mixed_stereo` suffix; this scheme carries no place component.
pub struct StereoMixConvention;

const MIX_SUFFIX: &str = "_mixed_stereo";

impl FilenameMetadataExtractor for StereoMixConvention {
    fn extract(&self, filename: &str) -> RecordingMetadata {
        let stem = strip_extension(filename);
        let date = leading_date(filename);

        let mut notes = stem;
        if let Some(date) = date {
            // The delimiter after the date may be `-` or `_`.
            notes = &notes[date.len() + 1..];
        }
        notes = notes.strip_suffix(MIX_SUFFIX).unwrap_or(notes);

        RecordingMetadata::new(date.unwrap_or(UNKNOWN_DATE), None, notes)
    }
}
