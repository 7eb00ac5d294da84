// src/domain/mod.rs
pub mod error;
pub mod note;
pub mod timestamp;

pub use error::DomainError;
pub use note::{CreateNoteRequest, ErrorResponse, Note, NotesResponse, UpdateNoteRequest};
