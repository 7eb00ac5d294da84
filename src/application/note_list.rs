// src/application/note_list.rs
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::application::NoteRepository;
use crate::domain::{DomainError, Note};

type DeleteOutcome = (String, Result<(), DomainError>);

/// Owns the visible note collection and its loading/error state.
///
/// All state changes happen through `&mut self`, i.e. on the task that owns
/// the controller. Background deletes report back over a channel and are only
/// applied when the owner drains it.
pub struct NoteListController<R: NoteRepository + 'static> {
    repository: Arc<R>,
    notes: Vec<Note>,
    is_loading: bool,
    error_message: Option<String>,
    in_flight: usize,
    completed_tx: UnboundedSender<DeleteOutcome>,
    completed_rx: UnboundedReceiver<DeleteOutcome>,
}

impl<R: NoteRepository + 'static> NoteListController<R> {
    pub fn new(repository: Arc<R>) -> Self {
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();
        Self {
            repository,
            notes: Vec::new(),
            is_loading: false,
            error_message: None,
            in_flight: 0,
            completed_tx,
            completed_rx,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Number of deletes issued but not yet applied
    pub fn pending_deletes(&self) -> usize {
        self.in_flight
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    /// Replace the collection with the backend's current list.
    ///
    /// On failure the previous collection stays as it was and an error
    /// message is recorded.
    pub async fn reload(&mut self) {
        self.is_loading = true;
        debug!("Reloading notes");

        match self.repository.list_notes().await {
            Ok(notes) => {
                info!(count = notes.len(), "Loaded notes");
                self.notes = notes;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load notes");
                self.error_message = Some(format!("Failed to load notes: {}", e));
            }
        }

        self.is_loading = false;
    }

    /// Optimistically remove the note at `index` and delete it in the background.
    ///
    /// Returns the id captured for the request, or `None` when `index` is out
    /// of range. A failed delete is reported through `error_message` once
    /// applied; the removed note is not put back.
    pub fn delete_at(&mut self, index: usize) -> Option<String> {
        if index >= self.notes.len() {
            debug!(index, len = self.notes.len(), "Delete index out of range");
            return None;
        }

        let note = self.notes.remove(index);
        let id = note.id;
        debug!(note_id = %id, index, "Removed note locally, deleting in background");

        let repository = Arc::clone(&self.repository);
        let tx = self.completed_tx.clone();
        let task_id = id.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            // a panicking request must still report, or settle() never returns
            let request_id = task_id.clone();
            let request = tokio::spawn(async move { repository.delete_note(&request_id).await });
            let result = request.await.unwrap_or_else(|e| {
                Err(DomainError::Transport(format!("delete task failed: {}", e)))
            });
            // receiver lives as long as the controller
            let _ = tx.send((task_id, result));
        });

        Some(id)
    }

    /// Apply every delete that has finished so far, without waiting.
    ///
    /// Returns the number of outcomes applied.
    pub fn apply_completed_deletes(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.completed_rx.try_recv() {
            self.apply_delete_outcome(outcome);
            applied += 1;
        }
        applied
    }

    /// Wait for every in-flight delete and apply its outcome.
    ///
    /// Returns the ids whose deletion failed, in completion order.
    pub async fn settle(&mut self) -> Vec<String> {
        let mut failed = Vec::new();
        while self.in_flight > 0 {
            let Some((id, result)) = self.completed_rx.recv().await else {
                break;
            };
            if result.is_err() {
                failed.push(id.clone());
            }
            self.apply_delete_outcome((id, result));
        }
        failed
    }

    fn apply_delete_outcome(&mut self, (id, result): DeleteOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(()) => info!(note_id = %id, "Deleted note"),
            Err(e) => {
                warn!(note_id = %id, error = %e, "Background delete failed");
                self.error_message = Some(format!("Failed to delete note: {}", e));
            }
        }
    }
}
