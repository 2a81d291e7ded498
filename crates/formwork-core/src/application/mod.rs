//! Application layer
//!
//! Owns the current schema for a host and runs the persistence, export and
//! share flows against the outbound ports.

pub mod handle;
pub mod service;

pub use handle::SchemaHandle;
pub use service::FormService;
