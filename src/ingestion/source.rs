//! Where datasheet bytes come from

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use super::errors::{IngestionError, IngestionResult};

/// Boxed future returned by [`DatasheetSource::read`]
pub type SourceFuture<'a> = Pin<Box<dyn Future<Output = IngestionResult<Vec<u8>>> + Send + 'a>>;

/// Supplies the raw bytes of a datasheet by file name
pub trait DatasheetSource: Send + Sync {
    fn read<'a>(&'a self, file_name: &'a str) -> SourceFuture<'a>;
}

/// Reads extracted datasheets from a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DatasheetSource for DirectorySource {
    fn read<'a>(&'a self, file_name: &'a str) -> SourceFuture<'a> {
        Box::pin(async move {
            tokio::fs::read(self.root.join(file_name))
                .await
                .map_err(|source| IngestionError::Source {
                    file: file_name.to_string(),
                    source,
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_file_bytes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Currency.txt"), b"#ID^\r\n1^\r\n").unwrap();

        let source = DirectorySource::new(dir.path());
        let bytes = source.read("Currency.txt").await.unwrap();
        assert_eq!(bytes, b"#ID^\r\n1^\r\n");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let source = DirectorySource::new(dir.path());
        let err = source.read("Factions.txt").await.unwrap_err();
        assert!(matches!(err, IngestionError::Source { ref file, .. } if file == "Factions.txt"));
    }
}
