//! Infrastructure layer
//!
//! Adapters for the outbound ports.

pub mod export;
pub mod notify;
pub mod persistence;

pub use export::DirectoryExporter;
pub use notify::{MemoryNotifier, TracingNotifier};
pub use persistence::{FileFormRepository, InMemoryFormRepository};
