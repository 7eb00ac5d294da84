// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Note not found: {0}")]
    NotFound(String),
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}
