use std::fmt::Write as _;
use std::path::Path;

use async_trait::async_trait;

use crate::application::ports::{ExportError, TranscriptExporter};
use crate::domain::Segment;

/// Plain-text transcript export, one `[HH:MM:SS - HH:MM:SS] text` line per
/// segment.
pub struct TextTranscriptWriter;

#[async_trait]
impl TranscriptExporter for TextTranscriptWriter {
    async fn export(&self, path: &Path, segments: &[Segment]) -> Result<(), ExportError> {
        let mut body = String::new();
        for segment in segments {
            let _ = writeln!(
                body,
                "[{} - {}] {}",
                format_hms(segment.start),
                format_hms(segment.end),
                segment.text
            );
        }

        tokio::fs::write(path, body).await?;
        tracing::debug!(path = %path.display(), lines = segments.len(), "Transcript text written");
        Ok(())
    }
}

fn format_hms(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
