//! Export adapter

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{FormsError, Result};
use crate::ports::outbound::FormExporter;

/// Writes exports as files in one directory
pub struct DirectoryExporter {
    dir: PathBuf,
}

impl DirectoryExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl FormExporter for DirectoryExporter {
    async fn export(&self, file_name: &str, contents: &str) -> Result<String> {
        // Only the final component is honoured
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| FormsError::Export(format!("invalid file name: {:?}", file_name)))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| FormsError::Export(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| FormsError::Export(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), bytes = contents.len(), "form exported");
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = DirectoryExporter::new(dir.path().join("out"));

        let location = exporter.export("Survey-1.json", "{}").await.unwrap();
        assert_eq!(std::fs::read_to_string(&location).unwrap(), "{}");
        assert!(location.ends_with("Survey-1.json"));
    }

    #[tokio::test]
    async fn test_export_ignores_directories_in_name() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = DirectoryExporter::new(dir.path());

        let location = exporter.export("../escape.json", "{}").await.unwrap();
        assert_eq!(Path::new(&location), dir.path().join("escape.json"));
        assert!(matches!(exporter.export("..", "{}").await, Err(FormsError::Export(_))));
    }
}
