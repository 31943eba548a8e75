//! Bearer token read from the key-manager secret file.

use crate::domain::error::TokenError;
use crate::ports::TokenProvider;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads the token file on every call so rotations are picked up without a
/// restart.
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenProvider for FileTokenProvider {
    async fn current_token(&self) -> Result<String, TokenError> {
        let path = self.path.display().to_string();
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| TokenError::Unavailable {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        // Secret files usually end with a newline, which is not a valid
        // header byte.
        let token = raw.trim();
        if token.is_empty() {
            return Err(TokenError::Empty { path });
        }
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_and_trims_token() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  tok123  ").unwrap();

        let provider = FileTokenProvider::new(file.path());
        assert_eq!(provider.current_token().await.unwrap(), "tok123");
    }

    #[tokio::test]
    async fn test_rotation_seen_on_next_call() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "first\n").unwrap();
        let provider = FileTokenProvider::new(file.path());
        assert_eq!(provider.current_token().await.unwrap(), "first");

        std::fs::write(file.path(), "second\n").unwrap();
        assert_eq!(provider.current_token().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileTokenProvider::new(dir.path().join("absent"));
        assert!(matches!(
            provider.current_token().await,
            Err(TokenError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_whitespace_only_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), " \n\t\n").unwrap();
        let provider = FileTokenProvider::new(file.path());
        assert!(matches!(
            provider.current_token().await,
            Err(TokenError::Empty { .. })
        ));
    }
}
