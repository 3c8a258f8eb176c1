use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use skrivari::application::ports::{
    ConversionError, ConversionSpec, DecodeOptions, FormatConverter, MediaProbe, ProbeError,
    RecordStore, TranscriptionEngine, TranscriptionError,
};
use skrivari::application::services::{
    DEFAULT_AUDIO_EXTENSIONS, LibraryScanner, OrchestratorConfig, TranscriptionOrchestrator,
};
use skrivari::domain::Segment;
use skrivari::infrastructure::export::TextTranscriptWriter;
use skrivari::infrastructure::naming::StereoMixConvention;
use skrivari::infrastructure::persistence::JsonSidecarStore;

struct FixedProbe;

#[async_trait]
impl MediaProbe for FixedProbe {
    async fn duration_seconds(&self, _path: &Path) -> Result<f64, ProbeError> {
        Ok(90.0)
    }
}

struct FailingProbe;

#[async_trait]
impl MediaProbe for FailingProbe {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        Err(ProbeError::NoAudioStream(path.display().to_string()))
    }
}

/// Converter that fabricates the target file, standing in for ffmpeg.
struct TouchConverter;

#[async_trait]
impl FormatConverter for TouchConverter {
    async fn convert(
        &self,
        _input: &Path,
        output: &Path,
        _spec: &ConversionSpec,
    ) -> Result<(), ConversionError> {
        tokio::fs::write(output, b"riff").await?;
        Ok(())
    }
}

struct ScriptedEngine {
    fail_for_stem: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    fn new() -> Self {
        Self {
            fail_for_stem: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_for(stem: &str) -> Self {
        Self {
            fail_for_stem: Some(stem.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for ScriptedEngine {
    async fn transcribe(
        &self,
        audio_path: &Path,
        _options: &DecodeOptions,
    ) -> Result<Vec<Segment>, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if self.fail_for_stem.as_deref() == Some(stem) {
            return Err(TranscriptionError::TranscriptionFailed("decode error".into()));
        }
        Ok(vec![
            Segment::new(0.0, 1.0, " hello"),
            Segment::new(0.0, 1.0, " hello"),
            Segment::new(1.0, 2.0, " world"),
        ])
    }
}

struct SlowEngine;

#[async_trait]
impl TranscriptionEngine for SlowEngine {
    async fn transcribe(
        &self,
        _audio_path: &Path,
        _options: &DecodeOptions,
    ) -> Result<Vec<Segment>, TranscriptionError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(vec![])
    }
}

fn scanner_for(root: &Path, store: Arc<JsonSidecarStore>) -> LibraryScanner {
    LibraryScanner::new(
        root.to_path_buf(),
        DEFAULT_AUDIO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        Arc::new(StereoMixConvention),
        store as Arc<dyn RecordStore>,
    )
}

fn orchestrator_with(
    probe: Arc<dyn MediaProbe>,
    engine: Arc<dyn TranscriptionEngine>,
    store: Arc<JsonSidecarStore>,
    config: OrchestratorConfig,
) -> Arc<TranscriptionOrchestrator> {
    Arc::new(TranscriptionOrchestrator::new(
        probe,
        Arc::new(TouchConverter),
        engine,
        store as Arc<dyn RecordStore>,
        Arc::new(TextTranscriptWriter),
        config,
    ))
}

#[tokio::test]
async fn given_pending_file_when_processed_then_sidecar_and_text_export_created() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.wav"), b"riff").unwrap();
    let store = Arc::new(JsonSidecarStore::new());
    let scanner = scanner_for(dir.path(), store.clone());
    let pending = scanner.scan().await.unwrap().pending;
    assert_eq!(pending.len(), 1);

    let orchestrator = orchestrator_with(
        Arc::new(FixedProbe),
        Arc::new(ScriptedEngine::new()),
        store.clone(),
        OrchestratorConfig::default(),
    );
    let report = orchestrator.run(pending, CancellationToken::new()).await;

    assert!(report.all_succeeded());
    assert_eq!(report.succeeded, vec!["a.wav".to_string()]);

    let sidecar: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("a.json")).unwrap()).unwrap();
    assert_eq!(sidecar["duration"], serde_json::json!(1.5));
    // Consecutive duplicate collapsed on ingestion.
    assert_eq!(sidecar["transcript"].as_array().unwrap().len(), 2);
    assert!(sidecar.get("annotations").is_none());

    let text = std::fs::read_to_string(dir.path().join("a.txt")).unwrap();
    assert_eq!(text, "[00:00:00 - 00:00:01]  hello\n[00:00:01 - 00:00:02]  world\n");

    // Rescan: nothing left to do.
    let rescan = scanner.scan().await.unwrap();
    assert!(rescan.pending.is_empty());
    assert_eq!(rescan.up_to_date, 1);
}

#[tokio::test]
async fn given_one_failing_file_when_batch_runs_then_others_still_processed() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.wav"), b"riff").unwrap();
    std::fs::write(dir.path().join("good.wav"), b"riff").unwrap();
    let store = Arc::new(JsonSidecarStore::new());
    let scanner = scanner_for(dir.path(), store.clone());
    let pending = scanner.scan().await.unwrap().pending;

    let orchestrator = orchestrator_with(
        Arc::new(FixedProbe),
        Arc::new(ScriptedEngine::failing_for("bad")),
        store.clone(),
        OrchestratorConfig::default(),
    );
    let report = orchestrator.run(pending, CancellationToken::new()).await;

    assert_eq!(report.succeeded, vec!["good.wav".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "bad.wav");
    assert!(dir.path().join("good.json").is_file());
    assert!(!dir.path().join("bad.json").exists());
}

#[tokio::test]
async fn given_probe_failure_when_batch_runs_then_that_file_fails_only() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.wav"), b"riff").unwrap();
    let store = Arc::new(JsonSidecarStore::new());
    let scanner = scanner_for(dir.path(), store.clone());
    let pending = scanner.scan().await.unwrap().pending;

    let orchestrator = orchestrator_with(
        Arc::new(FailingProbe),
        Arc::new(ScriptedEngine::new()),
        store.clone(),
        OrchestratorConfig::default(),
    );
    let report = orchestrator.run(pending, CancellationToken::new()).await;

    assert!(report.succeeded.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(!dir.path().join("a.json").exists());
}

#[tokio::test]
async fn given_non_wav_source_when_processed_then_converted_sibling_used() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.mp3"), b"id3").unwrap();
    let store = Arc::new(JsonSidecarStore::new());
    let scanner = scanner_for(dir.path(), store.clone());
    let pending = scanner.scan().await.unwrap().pending;

    let orchestrator = orchestrator_with(
        Arc::new(FixedProbe),
        Arc::new(ScriptedEngine::new()),
        store.clone(),
        OrchestratorConfig::default(),
    );
    let report = orchestrator.run(pending, CancellationToken::new()).await;

    assert!(report.all_succeeded());
    // TouchConverter produced the canonical sibling; record keyed by source.
    assert!(dir.path().join("a.wav").is_file());
    assert!(dir.path().join("a.json").is_file());
}

#[tokio::test(start_paused = true)]
async fn given_slow_engine_when_ceiling_exceeded_then_file_times_out() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.wav"), b"riff").unwrap();
    let store = Arc::new(JsonSidecarStore::new());
    let scanner = scanner_for(dir.path(), store.clone());
    let pending = scanner.scan().await.unwrap().pending;

    let orchestrator = orchestrator_with(
        Arc::new(FixedProbe),
        Arc::new(SlowEngine),
        store.clone(),
        OrchestratorConfig {
            timeout: Some(Duration::from_secs(1)),
            ..OrchestratorConfig::default()
        },
    );
    let report = orchestrator.run(pending, CancellationToken::new()).await;

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].1.contains("ceiling"));
    assert!(!dir.path().join("a.json").exists());
}

#[tokio::test]
async fn given_cancelled_token_when_batch_runs_then_no_partial_sidecars() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.wav"), b"riff").unwrap();
    let store = Arc::new(JsonSidecarStore::new());
    let scanner = scanner_for(dir.path(), store.clone());
    let pending = scanner.scan().await.unwrap().pending;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let orchestrator = orchestrator_with(
        Arc::new(FixedProbe),
        Arc::new(ScriptedEngine::new()),
        store.clone(),
        OrchestratorConfig::default(),
    );
    let report = orchestrator.run(pending, cancel).await;

    assert!(report.cancelled);
    assert!(report.succeeded.is_empty());
    assert!(!dir.path().join("a.json").exists());
}

#[tokio::test]
async fn given_existing_record_without_overwrite_when_processed_then_skipped() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.wav"), b"riff").unwrap();
    let store = Arc::new(JsonSidecarStore::new());
    let scanner = scanner_for(dir.path(), store.clone());
    let pending = scanner.scan().await.unwrap().pending;

    let engine = Arc::new(ScriptedEngine::new());
    let orchestrator = orchestrator_with(
        Arc::new(FixedProbe),
        engine.clone(),
        store.clone(),
        OrchestratorConfig::default(),
    );
    orchestrator.run(pending.clone(), CancellationToken::new()).await;
    let first_calls = engine.calls.load(Ordering::SeqCst);

    // Same work list again: record now exists, engine must not run.
    let orchestrator = orchestrator_with(
        Arc::new(FixedProbe),
        engine.clone(),
        store.clone(),
        OrchestratorConfig::default(),
    );
    let report = orchestrator.run(pending, CancellationToken::new()).await;

    assert!(report.all_succeeded());
    assert_eq!(engine.calls.load(Ordering::SeqCst), first_calls);
}
