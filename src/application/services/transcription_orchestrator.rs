use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::{
    ConversionError, ConversionSpec, DecodeOptions, ExportError, FormatConverter, MediaProbe,
    ProbeError, RecordStore, RecordStoreError, TranscriptExporter, TranscriptionEngine,
    TranscriptionError,
};
use crate::domain::{AudioFileRef, TranscriptRecord};

/// Extension the engine consumes directly; everything else is converted.
const CANONICAL_EXTENSION: &str = "wav";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Concurrent transcription jobs. Defaults to 1: the engine is often
    /// resource-exclusive (single GPU).
    pub workers: usize,
    /// Replace existing records instead of failing with AlreadyExists.
    pub overwrite: bool,
    /// Per-file ceiling on the transcription call; exceeding it fails that
    /// file only.
    pub timeout: Option<Duration>,
    pub decode_options: DecodeOptions,
    /// Minutes of audio transcribed per minute of wall time, used for the
    /// expected-completion log line.
    pub realtime_factor: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            overwrite: false,
            timeout: None,
            decode_options: DecodeOptions::default(),
            realtime_factor: 5.642,
        }
    }
}

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}

/// Drives pending recordings through probe, optional conversion,
/// transcription, and persistence. Files are independent: one failure is
/// logged and collected, the rest of the batch continues.
pub struct TranscriptionOrchestrator {
    probe: Arc<dyn MediaProbe>,
    converter: Arc<dyn FormatConverter>,
    engine: Arc<dyn TranscriptionEngine>,
    store: Arc<dyn RecordStore>,
    exporter: Arc<dyn TranscriptExporter>,
    config: OrchestratorConfig,
}

impl TranscriptionOrchestrator {
    pub fn new(
        probe: Arc<dyn MediaProbe>,
        converter: Arc<dyn FormatConverter>,
        engine: Arc<dyn TranscriptionEngine>,
        store: Arc<dyn RecordStore>,
        exporter: Arc<dyn TranscriptExporter>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            probe,
            converter,
            engine,
            store,
            exporter,
            config,
        }
    }

    pub async fn run(
        self: Arc<Self>,
        pending: Vec<AudioFileRef>,
        cancel: CancellationToken,
    ) -> BatchReport {
        let total = pending.len();
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut tasks: JoinSet<(String, Result<(), TranscriptionJobError>)> = JoinSet::new();

        for (index, audio) in pending.into_iter().enumerate() {
            let this = Arc::clone(&self);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let rel_path = audio.rel_path().to_string();
                let Ok(_permit) = semaphore.acquire().await else {
                    return (rel_path, Err(TranscriptionJobError::Cancelled));
                };
                if cancel.is_cancelled() {
                    return (rel_path, Err(TranscriptionJobError::Cancelled));
                }

                let span = tracing::info_span!(
                    "transcription_job",
                    file = %rel_path,
                    position = index + 1,
                    total = total,
                );

                let result = tokio::select! {
                    _ = cancel.cancelled() => Err(TranscriptionJobError::Cancelled),
                    res = this.process_file(&audio).instrument(span) => res,
                };
                (rel_path, result)
            });
        }

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((rel_path, Ok(()))) => {
                    tracing::info!(file = %rel_path, "Transcription completed");
                    report.succeeded.push(rel_path);
                }
                Ok((rel_path, Err(TranscriptionJobError::Cancelled))) => {
                    report.cancelled = true;
                    tracing::info!(file = %rel_path, "Transcription cancelled");
                }
                Ok((rel_path, Err(e))) => {
                    tracing::error!(file = %rel_path, error = %e, "Transcription failed");
                    report.failed.push((rel_path, e.to_string()));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Transcription task panicked");
                    report.failed.push(("<unknown>".to_string(), e.to_string()));
                }
            }
        }

        report.succeeded.sort();
        report.failed.sort();
        report
    }

    async fn process_file(&self, audio: &AudioFileRef) -> Result<(), TranscriptionJobError> {
        if !self.config.overwrite && self.store.exists(audio).await {
            tracing::info!(file = %audio.rel_path(), "Skipping, record already exists");
            return Ok(());
        }

        let duration_seconds = self.probe.duration_seconds(audio.abs_path()).await?;
        let duration_minutes = duration_seconds / 60.0;

        let estimated_minutes = duration_minutes / self.config.realtime_factor;
        let expected_end = chrono::Local::now()
            + chrono::Duration::seconds((estimated_minutes * 60.0) as i64);
        tracing::info!(
            duration_minutes = format!("{:.2}", duration_minutes),
            estimated_minutes = format!("{:.2}", estimated_minutes),
            expected_completion = %expected_end.format("%Y-%m-%d %H:%M:%S"),
            "Starting transcription"
        );

        let input_path = if audio.extension() == CANONICAL_EXTENSION {
            audio.abs_path().to_path_buf()
        } else {
            let wav_path = audio.abs_path().with_extension(CANONICAL_EXTENSION);
            if tokio::fs::try_exists(&wav_path).await.unwrap_or(false) {
                tracing::debug!(target = %wav_path.display(), "Reusing existing converted file");
            } else {
                tracing::info!(
                    from = %audio.extension(),
                    target = %wav_path.display(),
                    "Converting to canonical format"
                );
                self.converter
                    .convert(audio.abs_path(), &wav_path, &ConversionSpec::default())
                    .await?;
            }
            wav_path
        };

        let transcription = self
            .engine
            .transcribe(&input_path, &self.config.decode_options);
        let segments = match self.config.timeout {
            Some(ceiling) => tokio::time::timeout(ceiling, transcription)
                .await
                .map_err(|_| TranscriptionJobError::TimedOut(ceiling.as_secs()))??,
            None => transcription.await?,
        };

        let record = TranscriptRecord::from_raw_segments(
            audio.rel_path(),
            duration_minutes,
            audio.metadata().clone(),
            segments,
        );

        if self.config.overwrite {
            self.store.replace(audio, &record).await?;
        } else {
            self.store.create(audio, &record).await?;
        }

        let text_path = self.store.locate(audio).with_extension("txt");
        self.exporter.export(&text_path, &record.transcript).await?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionJobError {
    #[error("probe: {0}")]
    Probe(#[from] ProbeError),
    #[error("conversion: {0}")]
    Conversion(#[from] ConversionError),
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("transcription exceeded {0}s ceiling")]
    TimedOut(u64),
    #[error("record store: {0}")]
    Store(#[from] RecordStoreError),
    #[error("export: {0}")]
    Export(#[from] ExportError),
    #[error("cancelled")]
    Cancelled,
}
