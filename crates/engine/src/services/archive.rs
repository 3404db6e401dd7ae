//! 7-Zip archiver.
//!
//! Shells out to the 7-Zip binary to produce password-protected zip
//! containers. The password travels on the command line, which matches the
//! deployment's existing operational posture for this tool.

use std::path::Path;

use domain::services::{ArchiveError, ArchiveTool};
use tokio::process::Command;
use tracing::debug;

/// Archiver backed by an external 7-Zip binary.
#[derive(Debug, Clone)]
pub struct SevenZipArchiver {
    binary: String,
}

impl SevenZipArchiver {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait::async_trait]
impl ArchiveTool for SevenZipArchiver {
    async fn compress(
        &self,
        source: &Path,
        dest: &Path,
        password: &str,
    ) -> Result<(), ArchiveError> {
        debug!(source = %source.display(), dest = %dest.display(), "Compressing attachment");

        let output = Command::new(&self.binary)
            .arg("a")
            .arg(format!("-p{}", password))
            .arg("-y")
            .arg(dest)
            .arg(source)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ArchiveError::ToolUnavailable(self.binary.clone())
                } else {
                    ArchiveError::CompressionFailed(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ArchiveError::CompressionFailed(stderr.trim().to_string()));
        }

        if !dest.exists() {
            return Err(ArchiveError::MissingOutput);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_reports_unavailable() {
        let archiver = SevenZipArchiver::new("definitely-not-a-real-7z-binary");
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("input.txt");
        let dest = dir.path().join("output.zip");
        tokio::fs::write(&source, b"payload").await.unwrap();

        let result = archiver.compress(&source, &dest, "pw").await;
        assert!(matches!(result, Err(ArchiveError::ToolUnavailable(_))));
    }
}
