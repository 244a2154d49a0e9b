//! Domain layer for the engagement engine
//!
//! This module contains the plain data models, the collaborator ports and the
//! error types shared by every service.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{DomainError, DomainResult};
