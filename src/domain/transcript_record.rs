use serde_json::{Map, Value, json};

use super::recording_metadata::RecordingMetadata;
use super::segment::Segment;

/// The persisted unit: one audio file's transcript plus its annotations.
///
/// `source_path`, `duration_minutes`, and the filename-derived metadata are
/// fixed at creation time. The transcript is only ever replaced as a whole;
/// annotations are append-only. Every update operation returns a new record
/// so callers cannot partially mutate one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRecord {
    pub source_path: String,
    pub duration_minutes: f64,
    pub metadata: RecordingMetadata,
    pub transcript: Vec<Segment>,
    pub annotations: Vec<Value>,
}

impl TranscriptRecord {
    /// Build a record from a raw engine result, collapsing consecutive
    /// fully-identical segments. Stalled decodes re-emit the same segment
    /// back to back; only the first of such a run is kept.
    pub fn from_raw_segments(
        source_path: impl Into<String>,
        duration_minutes: f64,
        metadata: RecordingMetadata,
        segments: Vec<Segment>,
    ) -> Self {
        let mut transcript = segments;
        transcript.dedup();
        Self {
            source_path: source_path.into(),
            duration_minutes,
            metadata,
            transcript,
            annotations: Vec::new(),
        }
    }

    /// New record with the transcript replaced wholesale; everything else
    /// is carried over unchanged.
    pub fn merge_transcript_update(&self, new_segments: Vec<Segment>) -> Self {
        Self {
            transcript: new_segments,
            ..self.clone()
        }
    }

    /// New record with exactly one annotation appended at the end.
    pub fn append_annotation(&self, value: Value) -> Self {
        let mut annotations = self.annotations.clone();
        annotations.push(value);
        Self {
            annotations,
            ..self.clone()
        }
    }

    /// Canonical sidecar shape. `place` is omitted when unknown and
    /// `annotations` is omitted until the first append.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("source_path".into(), json!(self.source_path));
        doc.insert("duration".into(), json!(self.duration_minutes));
        doc.insert("date".into(), json!(self.metadata.date));
        if let Some(place) = &self.metadata.place {
            doc.insert("place".into(), json!(place));
        }
        doc.insert("notes".into(), json!(self.metadata.notes));
        doc.insert(
            "transcript".into(),
            serde_json::to_value(&self.transcript).unwrap_or_else(|_| json!([])),
        );
        if !self.annotations.is_empty() {
            doc.insert("annotations".into(), Value::Array(self.annotations.clone()));
        }
        Value::Object(doc)
    }

    /// Parse and validate a sidecar document. The error names the first
    /// offending key; unknown keys are tolerated (and preserved by the
    /// store, which mutates the raw document rather than this struct).
    pub fn from_document(doc: &Value) -> Result<Self, String> {
        let obj = doc
            .as_object()
            .ok_or_else(|| "document is not a JSON object".to_string())?;

        let source_path = require_str(obj, "source_path")?;
        let duration_minutes = obj
            .get("duration")
            .and_then(Value::as_f64)
            .ok_or_else(|| "missing or non-numeric key: duration".to_string())?;
        let date = require_str(obj, "date")?;
        let notes = require_str(obj, "notes")?;
        let place = match obj.get("place") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err("non-string key: place".to_string()),
        };

        let transcript_value = obj
            .get("transcript")
            .ok_or_else(|| "missing key: transcript".to_string())?;
        let transcript: Vec<Segment> = serde_json::from_value(transcript_value.clone())
            .map_err(|e| format!("invalid transcript: {}", e))?;

        let annotations = match obj.get("annotations") {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err("non-array key: annotations".to_string()),
        };

        Ok(Self {
            source_path,
            duration_minutes,
            metadata: RecordingMetadata { date, place, notes },
            transcript,
            annotations,
        })
    }
}

fn require_str(obj: &Map<String, Value>, key: &str) -> Result<String, String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| format!("missing or non-string key: {}", key))
}
