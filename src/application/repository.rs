// src/application/repository.rs
use async_trait::async_trait;

use crate::domain::{DomainError, Note, UpdateNoteRequest};

/// Backend access used by the controllers.
///
/// Each call maps to exactly one request; implementations must not queue,
/// retry or time out on their own.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn list_notes(&self) -> Result<Vec<Note>, DomainError>;

    async fn get_note(&self, id: &str) -> Result<Note, DomainError>;

    async fn create_note(&self, title: &str, content: &str) -> Result<Note, DomainError>;

    /// Apply a sparse update; fields left as `None` are not sent.
    async fn update_note(&self, id: &str, changes: UpdateNoteRequest) -> Result<Note, DomainError>;

    async fn delete_note(&self, id: &str) -> Result<(), DomainError>;
}
