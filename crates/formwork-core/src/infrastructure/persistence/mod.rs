//! Repository implementations
//!
//! Both adapters keep the durable encoding, so whatever one writes the other
//! (and an export file) can read.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::codec::durable::{decode_document, encode_for_storage};
use crate::domain::aggregates::SchemaPayload;
use crate::error::{FormsError, Result};
use crate::ports::outbound::{FormRepository, StoredForm};

fn to_stored(text: &str) -> Result<StoredForm> {
    let doc = decode_document(text)?;
    Ok(StoredForm {
        payload: doc.payload,
        saved_at: doc.saved_at,
    })
}

// =============================================================================
// In-memory
// =============================================================================

/// In-memory repository (for tests and ephemeral sessions)
#[derive(Default)]
pub struct InMemoryFormRepository {
    slot: RwLock<Option<String>>,
}

impl InMemoryFormRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document
    pub fn raw(&self) -> Option<String> {
        self.slot.read().clone()
    }

    /// Put arbitrary text in the slot
    pub fn set_raw(&self, text: impl Into<String>) {
        *self.slot.write() = Some(text.into());
    }
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn save(&self, payload: &SchemaPayload) -> Result<()> {
        let text = encode_for_storage(payload, Utc::now())?;
        *self.slot.write() = Some(text);
        Ok(())
    }

    async fn load(&self) -> Result<Option<StoredForm>> {
        let text = self.slot.read().clone();
        text.as_deref().map(to_stored).transpose()
    }

    async fn clear(&self) -> Result<()> {
        self.slot.write().take();
        Ok(())
    }
}

// =============================================================================
// File
// =============================================================================

/// Repository backed by a single JSON file
pub struct FileFormRepository {
    path: PathBuf,
}

impl FileFormRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FormRepository for FileFormRepository {
    async fn save(&self, payload: &SchemaPayload) -> Result<()> {
        let text = encode_for_storage(payload, Utc::now())?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FormsError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| FormsError::Storage(format!("{}: {}", self.path.display(), e)))?;

        info!(path = %self.path.display(), fields = payload.fields.len(), "form saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<StoredForm>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved form");
                return Ok(None);
            }
            Err(e) => return Err(FormsError::Storage(format!("{}: {}", self.path.display(), e))),
        };
        to_stored(&text).map(Some)
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FormsError::Storage(format!("{}: {}", self.path.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::FormSchema;
    use crate::domain::value_objects::FieldType;

    fn payload() -> SchemaPayload {
        let mut schema = FormSchema::with_title("Survey");
        schema.add_field(FieldType::Radio);
        schema.add_field(FieldType::Email);
        schema.to_payload()
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let repo = InMemoryFormRepository::new();
        assert!(repo.load().await.unwrap().is_none());

        repo.save(&payload()).await.unwrap();
        let stored = repo.load().await.unwrap().unwrap();
        assert_eq!(stored.payload, payload());
        assert!(stored.saved_at.is_some());
        assert!(repo.raw().unwrap().contains("\"savedAt\""));

        repo.clear().await.unwrap();
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_corrupt_slot() {
        let repo = InMemoryFormRepository::new();
        repo.set_raw("{\"formTitle\": 1");
        assert!(matches!(repo.load().await, Err(FormsError::Decode(_))));
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileFormRepository::new(dir.path().join("nested").join("form.json"));

        assert!(repo.load().await.unwrap().is_none());
        repo.save(&payload()).await.unwrap();
        assert!(repo.path().exists());

        let stored = repo.load().await.unwrap().unwrap();
        assert_eq!(stored.payload, payload());

        repo.clear().await.unwrap();
        assert!(!repo.path().exists());
        // Clearing twice is fine
        repo.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_reads_export_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        let text = crate::codec::durable::encode_for_export(&payload(), Utc::now()).unwrap();
        std::fs::write(&path, text).unwrap();

        let stored = FileFormRepository::new(&path).load().await.unwrap().unwrap();
        assert_eq!(stored.payload, payload());
        assert!(stored.saved_at.is_none());
    }
}
