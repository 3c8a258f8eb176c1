use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::application::ports::{FilenameMetadataExtractor, RecordStore, RecordStoreError};
use crate::domain::{AudioFileRef, InvalidAudioPath};

/// Audio extensions recognized by default.
pub const DEFAULT_AUDIO_EXTENSIONS: [&str; 7] =
    ["wav", "mp3", "flac", "aac", "ogg", "m4a", "aiff"];

/// A sidecar that exists but fails validation. Surfaced, never rewritten.
#[derive(Debug, Clone)]
pub struct CorruptSidecar {
    pub rel_path: String,
    pub sidecar_path: PathBuf,
    pub reason: String,
}

/// Outcome of one reconciliation pass over the library.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub pending: Vec<AudioFileRef>,
    pub corrupt: Vec<CorruptSidecar>,
    /// Sidecars the store could not read at all (I/O), as
    /// `(rel_path, error)`. Like corrupt ones: surfaced, skipped, never
    /// rewritten.
    pub unreadable: Vec<(String, String)>,
    pub up_to_date: usize,
}

/// Walks the library root and reconciles discovered recordings against the
/// record store: files with no sidecar become pending work, files with a
/// valid sidecar are counted as up to date, and corrupt sidecars are
/// reported as warnings. Traversal is depth-first in lexicographic order,
/// so repeated scans over an unchanged tree yield identical reports.
pub struct LibraryScanner {
    root: PathBuf,
    extensions: Vec<String>,
    extractor: Arc<dyn FilenameMetadataExtractor>,
    store: Arc<dyn RecordStore>,
}

impl LibraryScanner {
    pub fn new(
        root: PathBuf,
        extensions: Vec<String>,
        extractor: Arc<dyn FilenameMetadataExtractor>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self {
            root,
            extensions,
            extractor,
            store,
        }
    }

    pub async fn scan(&self) -> Result<ScanReport, ScanError> {
        if !self.root.is_dir() {
            return Err(ScanError::RootNotFound(self.root.display().to_string()));
        }

        let mut report = ScanReport::default();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

        for entry in walker {
            let entry = entry.map_err(|e| ScanError::Walk(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(extension) = entry.path().extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !self.recognizes(extension) {
                continue;
            }

            let audio = self.build_ref(entry.path())?;
            self.classify(audio, &mut report).await;
        }

        tracing::info!(
            pending = report.pending.len(),
            up_to_date = report.up_to_date,
            corrupt = report.corrupt.len(),
            unreadable = report.unreadable.len(),
            root = %self.root.display(),
            "Library scan completed"
        );

        Ok(report)
    }

    /// Single-file mode: validates the extension and builds a ref without
    /// consulting the store, so the caller decides about an existing record.
    pub fn scan_single(&self, file: &Path) -> Result<AudioFileRef, ScanError> {
        if !file.is_file() {
            return Err(ScanError::RootNotFound(file.display().to_string()));
        }
        let extension = file.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !self.recognizes(extension) {
            return Err(ScanError::UnsupportedExtension(format!(
                "{} (expected one of: {})",
                file.display(),
                self.extensions.join(", ")
            )));
        }
        self.build_ref(file)
    }

    /// Files are independent: a sidecar that cannot be read only removes
    /// that file from the batch, never the whole scan.
    async fn classify(&self, audio: AudioFileRef, report: &mut ScanReport) {
        if !self.store.exists(&audio).await {
            report.pending.push(audio);
            return;
        }
        match self.store.read(&audio).await {
            Ok(_) => report.up_to_date += 1,
            Err(RecordStoreError::Corrupt(reason)) => {
                let sidecar_path = self.store.locate(&audio);
                tracing::warn!(
                    file = %audio.rel_path(),
                    sidecar = %sidecar_path.display(),
                    reason = %reason,
                    "Corrupt sidecar record; leaving it untouched"
                );
                report.corrupt.push(CorruptSidecar {
                    rel_path: audio.rel_path().to_string(),
                    sidecar_path,
                    reason,
                });
            }
            Err(e) => {
                tracing::warn!(
                    file = %audio.rel_path(),
                    error = %e,
                    "Failed to read sidecar record; skipping file"
                );
                report
                    .unreadable
                    .push((audio.rel_path().to_string(), e.to_string()));
            }
        }
    }

    fn recognizes(&self, extension: &str) -> bool {
        let lowered = extension.to_ascii_lowercase();
        self.extensions.iter().any(|e| *e == lowered)
    }

    fn build_ref(&self, path: &Path) -> Result<AudioFileRef, ScanError> {
        let rel = path
            .strip_prefix(&self.root)
            .map_err(|_| ScanError::InvalidPath(path.display().to_string()))?;
        let rel_path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let metadata = self.extractor.extract(&filename);
        AudioFileRef::new(&self.root, &rel_path, metadata).map_err(ScanError::from)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    // Covers AppleDouble `._*` artifacts, sidecar temp files, and dotfiles.
    name.to_string_lossy().starts_with('.')
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("path not found or not accessible: {0}")]
    RootNotFound(String),
    #[error("directory walk failed: {0}")]
    Walk(String),
    #[error("not an audio file: {0}")]
    UnsupportedExtension(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<InvalidAudioPath> for ScanError {
    fn from(e: InvalidAudioPath) -> Self {
        ScanError::InvalidPath(e.to_string())
    }
}
