use crate::application::ports::FilenameMetadataExtractor;
use crate::domain::{RecordingMetadata, UNKNOWN_DATE};

use super::date_prefix::{leading_date, strip_extension};

/// Convention for renamed library files: `{date}_{Place}_{Note}_{Note}.wav`.
///
/// The first underscore token after the date is the place, the remaining
/// tokens join into the notes. Without a date prefix the whole stem becomes
/// notes and no place is claimed.
pub struct DatedUnderscoreConvention;

impl FilenameMetadataExtractor for DatedUnderscoreConvention {
    fn extract(&self, filename: &str) -> RecordingMetadata {
        let stem = strip_extension(filename);

        let Some(date) = leading_date(filename) else {
            return RecordingMetadata::new(UNKNOWN_DATE, None, stem.replace('_', " "));
        };

        let remainder = &stem[date.len() + 1..];
        let mut tokens = remainder.split('_').filter(|t| !t.is_empty());
        let place = tokens.next().map(String::from);
        let notes = tokens.collect::<Vec<_>>().join(" ");

        RecordingMetadata::new(date, place, notes)
    }
}
