//! Ports module (Hexagonal Architecture)
//!
//! Interfaces for the host-supplied collaborators.

pub mod outbound;

pub use outbound::*;
