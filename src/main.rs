use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use skrivari::application::ports::{DecodeOptions, RecordStore};
use skrivari::application::services::{
    LibraryScanner, OrchestratorConfig, TranscriptionOrchestrator,
};
use skrivari::infrastructure::export::TextTranscriptWriter;
use skrivari::infrastructure::media::{FfmpegConverter, FfprobeDurationProbe};
use skrivari::infrastructure::naming::{ExtractorFactory, NamingConvention};
use skrivari::infrastructure::observability::{TracingConfig, init_tracing};
use skrivari::infrastructure::persistence::JsonSidecarStore;
use skrivari::infrastructure::transcription::TranscriptionEngineFactory;
use skrivari::presentation::{AppState, Environment, Settings, create_router};

#[derive(Parser)]
#[command(name = "skrivari", about = "Batch audio transcription archive")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe a library root or a single audio file.
    Transcribe {
        /// Root directory to scan, or one audio file.
        path: PathBuf,
        /// Destination folder for sidecars and text exports (flattened).
        #[arg(short = 'd', long)]
        destination: Option<PathBuf>,
        /// Replace existing records instead of skipping them.
        #[arg(long)]
        overwrite: bool,
        /// Filename convention for this batch (stereo_mix, dated_underscore).
        #[arg(long)]
        convention: Option<String>,
        /// Concurrent transcription jobs.
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Serve the browsing/editing HTTP API.
    Serve {
        /// Library root to serve.
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::load().map_err(|e| anyhow::anyhow!("configuration: {}", e))?;

    let environment =
        Environment::try_from(std::env::var("SKRIVARI_ENV").unwrap_or_else(|_| "local".to_string()))
            .map_err(|e| anyhow::anyhow!(e))?;
    init_tracing(TracingConfig {
        environment: environment.to_string(),
        json_format: settings.logging.enable_json,
    });

    match cli.command {
        Command::Transcribe {
            path,
            destination,
            overwrite,
            convention,
            workers,
        } => run_transcribe(settings, path, destination, overwrite, convention, workers).await,
        Command::Serve { root, port } => run_serve(settings, root, port).await,
    }
}

async fn run_transcribe(
    settings: Settings,
    path: PathBuf,
    destination: Option<PathBuf>,
    overwrite: bool,
    convention: Option<String>,
    workers: Option<usize>,
) -> anyhow::Result<()> {
    let convention = match convention {
        Some(name) => NamingConvention::try_from(name).map_err(|e| anyhow::anyhow!(e))?,
        None => settings.library.convention,
    };
    let extractor = ExtractorFactory::create(convention);

    let destination = destination.or_else(|| settings.library.destination.clone());
    let store: Arc<dyn RecordStore> = Arc::new(match destination {
        Some(dir) => JsonSidecarStore::with_destination(dir),
        None => JsonSidecarStore::new(),
    });

    let engine = TranscriptionEngineFactory::create(
        settings.transcription.provider,
        &settings.transcription.model,
        settings.transcription.api_key.clone(),
        settings.transcription.base_url.clone(),
        settings.transcription.binary.clone(),
    )?;

    let single_file = path.is_file();
    let root = if single_file {
        path.parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        path.clone()
    };

    let scanner = LibraryScanner::new(
        root,
        settings.library.extensions.clone(),
        Arc::clone(&extractor),
        Arc::clone(&store),
    );

    let pending = if single_file {
        vec![scanner.scan_single(&path)?]
    } else {
        let report = scanner.scan().await?;
        for corrupt in &report.corrupt {
            eprintln!(
                "warning: corrupt record for {} at {} ({})",
                corrupt.rel_path,
                corrupt.sidecar_path.display(),
                corrupt.reason
            );
        }
        for (rel_path, error) in &report.unreadable {
            eprintln!("warning: unreadable record for {} ({})", rel_path, error);
        }
        report.pending
    };

    if pending.is_empty() {
        tracing::info!("Nothing to transcribe");
        return Ok(());
    }
    tracing::info!(files = pending.len(), "Starting batch transcription");

    let orchestrator = Arc::new(TranscriptionOrchestrator::new(
        Arc::new(FfprobeDurationProbe::new()),
        Arc::new(FfmpegConverter::new()),
        engine,
        store,
        Arc::new(TextTranscriptWriter),
        OrchestratorConfig {
            workers: workers.unwrap_or(settings.transcription.workers),
            overwrite,
            timeout: settings
                .transcription
                .timeout_minutes
                .map(|m| Duration::from_secs(m * 60)),
            decode_options: DecodeOptions {
                temperature: settings.transcription.temperature,
                beam_size: settings.transcription.beam_size,
                fp16: settings.transcription.fp16,
            },
            realtime_factor: settings.transcription.realtime_factor,
        },
    ));

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight work");
            signal_cancel.cancel();
        }
    });

    let report = orchestrator.run(pending, cancel).await;

    eprintln!(
        "transcribed {} file(s), {} failed{}",
        report.succeeded.len(),
        report.failed.len(),
        if report.cancelled { " (cancelled)" } else { "" }
    );
    for (rel_path, error) in &report.failed {
        eprintln!("failed: {}: {}", rel_path, error);
    }

    if report.all_succeeded() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

async fn run_serve(
    mut settings: Settings,
    root: Option<PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(root) = root {
        settings.library.root = root;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    let extractor = ExtractorFactory::create(settings.library.convention);
    let store: Arc<dyn RecordStore> = Arc::new(match settings.library.destination.clone() {
        Some(dir) => JsonSidecarStore::with_destination(dir),
        None => JsonSidecarStore::new(),
    });

    let state = AppState {
        record_store: store,
        extractor,
        settings: settings.clone(),
    };
    let router = create_router(state);

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    tracing::info!(root = %settings.library.root.display(), "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
