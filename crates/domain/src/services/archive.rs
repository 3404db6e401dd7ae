//! Archive tool collaborator.

use std::path::Path;

/// Errors from the archive tool.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Archive tool not available: {0}")]
    ToolUnavailable(String),

    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Archive was not produced at the destination path")]
    MissingOutput,
}

/// Produces a password-protected archive containing a single input file.
#[async_trait::async_trait]
pub trait ArchiveTool: Send + Sync {
    /// Compresses `source` into a password-protected archive at `dest`.
    /// Returns only once the archive verifiably exists.
    async fn compress(&self, source: &Path, dest: &Path, password: &str) -> Result<(), ArchiveError>;
}

/// Mock archiver for tests: copies the source to the destination and records
/// the password it was handed.
#[derive(Debug, Default)]
pub struct MockArchiveTool {
    pub simulate_failure: bool,
    pub passwords: std::sync::Mutex<Vec<String>>,
}

impl MockArchiveTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            passwords: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn used_passwords(&self) -> Vec<String> {
        self.passwords.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ArchiveTool for MockArchiveTool {
    async fn compress(&self, source: &Path, dest: &Path, password: &str) -> Result<(), ArchiveError> {
        if let Ok(mut passwords) = self.passwords.lock() {
            passwords.push(password.to_string());
        }
        if self.simulate_failure {
            // A real archiver can die mid-write and leave a partial container.
            let _ = tokio::fs::write(dest, b"partial").await;
            return Err(ArchiveError::CompressionFailed("simulated failure".into()));
        }
        tokio::fs::copy(source, dest)
            .await
            .map_err(|e| ArchiveError::CompressionFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_archive_copies_and_records_password() {
        let dir = std::env::temp_dir().join(format!("archive-test-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let source = dir.join("input.txt");
        let dest = dir.join("output.zip");
        tokio::fs::write(&source, b"payload").await.unwrap();

        let tool = MockArchiveTool::new();
        tool.compress(&source, &dest, "jdoe").await.unwrap();

        assert!(dest.exists());
        assert_eq!(tool.used_passwords(), vec!["jdoe".to_string()]);
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_failing_mock_archive_leaves_partial_output() {
        let dir = std::env::temp_dir().join(format!("archive-test-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let source = dir.join("input.txt");
        let dest = dir.join("output.zip");
        tokio::fs::write(&source, b"payload").await.unwrap();

        let tool = MockArchiveTool::failing();
        let result = tool.compress(&source, &dest, "pw").await;
        assert!(matches!(result, Err(ArchiveError::CompressionFailed(_))));
        assert!(dest.exists());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
