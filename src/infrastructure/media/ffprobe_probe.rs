use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{MediaProbe, ProbeError};

/// Duration probe backed by the `ffprobe` binary.
pub struct FfprobeDurationProbe {
    binary: String,
}

impl FfprobeDurationProbe {
    pub fn new() -> Self {
        Self {
            binary: "ffprobe".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaProbe for FfprobeDurationProbe {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        let output = Command::new(&self.binary)
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("a:0")
            .arg("-show_entries")
            .arg("stream=duration")
            .arg("-of")
            .arg("csv=p=0")
            .arg(path)
            .output()
            .await
            .map_err(|e| ProbeError::ProbeFailed(format!("spawn {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::ProbeFailed(format!(
                "{}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.trim();
        if line.is_empty() {
            return Err(ProbeError::NoAudioStream(path.display().to_string()));
        }

        line.parse::<f64>().map_err(|e| {
            ProbeError::ProbeFailed(format!("unparseable duration {:?}: {}", line, e))
        })
    }
}
