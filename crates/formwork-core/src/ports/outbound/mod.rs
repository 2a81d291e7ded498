//! Outbound ports
//!
//! Infrastructure implements these; the application layer only sees the traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::aggregates::SchemaPayload;
use crate::error::Result;

/// A payload read back from storage
#[derive(Clone, Debug, PartialEq)]
pub struct StoredForm {
    pub payload: SchemaPayload,
    pub saved_at: Option<DateTime<Utc>>,
}

/// Single-slot schema storage
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Overwrite the slot
    async fn save(&self, payload: &SchemaPayload) -> Result<()>;

    /// Read the slot; `None` when nothing was saved
    async fn load(&self) -> Result<Option<StoredForm>>;

    /// Empty the slot
    async fn clear(&self) -> Result<()>;
}

/// Destination for exported documents
#[async_trait]
pub trait FormExporter: Send + Sync {
    /// Write `contents` under `file_name` and return where it went
    async fn export(&self, file_name: &str, contents: &str) -> Result<String>;
}

/// Notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
}
