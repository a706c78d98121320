//! InviSignia Core Library
//!
//! This crate provides the shared domain models, error taxonomy, configuration,
//! and input validation used across all InviSignia client components.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ErrorKind, WorkflowError};
pub use models::{HistoryEntry, MediaAsset, RegisterResponse, Session, TokenResponse, VerificationRecord};
