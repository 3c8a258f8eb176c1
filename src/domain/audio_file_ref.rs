use std::path::{Component, Path, PathBuf};

use super::recording_metadata::RecordingMetadata;

/// Identity of one recording inside the library.
///
/// `rel_path` is the `/`-separated path relative to the library root and is
/// the logical identity of the recording; `abs_path` is the resolved
/// filesystem location. Construction rejects absolute and `..`-bearing
/// relative paths, which doubles as the traversal guard for paths arriving
/// over HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFileRef {
    abs_path: PathBuf,
    rel_path: String,
    extension: String,
    metadata: RecordingMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidAudioPath {
    #[error("path is empty")]
    Empty,
    #[error("path must be relative to the library root: {0}")]
    Absolute(String),
    #[error("path escapes the library root: {0}")]
    Traversal(String),
}

impl AudioFileRef {
    pub fn new(
        root: &Path,
        rel_path: &str,
        metadata: RecordingMetadata,
    ) -> Result<Self, InvalidAudioPath> {
        let normalized = rel_path.replace('\\', "/");
        if normalized.is_empty() {
            return Err(InvalidAudioPath::Empty);
        }

        let candidate = Path::new(&normalized);
        if candidate.is_absolute() || normalized.starts_with('/') {
            return Err(InvalidAudioPath::Absolute(normalized));
        }
        for component in candidate.components() {
            match component {
                Component::Normal(_) => {}
                _ => return Err(InvalidAudioPath::Traversal(normalized)),
            }
        }

        let extension = candidate
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        Ok(Self {
            abs_path: root.join(candidate),
            rel_path: normalized,
            extension,
            metadata,
        })
    }

    pub fn abs_path(&self) -> &Path {
        &self.abs_path
    }

    pub fn rel_path(&self) -> &str {
        &self.rel_path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Filename without directory and without the final extension.
    pub fn file_stem(&self) -> &str {
        let name = self
            .rel_path
            .rsplit('/')
            .next()
            .unwrap_or(self.rel_path.as_str());
        name.rfind('.').map(|i| &name[..i]).unwrap_or(name)
    }

    pub fn file_name(&self) -> &str {
        self.rel_path
            .rsplit('/')
            .next()
            .unwrap_or(self.rel_path.as_str())
    }

    pub fn metadata(&self) -> &RecordingMetadata {
        &self.metadata
    }
}
