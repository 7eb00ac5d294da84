// src/application/note_editor.rs
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::NoteRepository;
use crate::domain::{Note, UpdateNoteRequest};

/// Locally held copy of a note's editable fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }

    /// Title with surrounding whitespace (newlines included) removed
    pub fn trimmed_title(&self) -> &str {
        self.title.trim()
    }

    pub fn is_valid(&self) -> bool {
        !self.trimmed_title().is_empty()
    }

    /// Fields that differ from `original`.
    ///
    /// The title is compared after trimming, the content verbatim.
    pub fn diff(&self, original: &Note) -> UpdateNoteRequest {
        let title = self.trimmed_title();
        UpdateNoteRequest {
            title: (title != original.title).then(|| title.to_string()),
            content: (self.content != original.content).then(|| self.content.clone()),
        }
    }
}

/// Notification for the owner of an editor after a successful action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A new note was created; the list should reload.
    Saved(Note),
    /// An existing note was updated; the list should reload.
    Updated(Note),
    /// The note was deleted; the list should reload and the view close.
    Deleted(String),
}

/// Draft state for the "add" and "edit" flows.
///
/// An editor built with [`NoteEditor::for_new`] creates a note on save; one
/// built with [`NoteEditor::for_existing`] sends a sparse update holding only
/// the fields that changed.
pub struct NoteEditor<R: NoteRepository> {
    repository: Arc<R>,
    original: Option<Note>,
    draft: NoteDraft,
    is_editing: bool,
    is_saving: bool,
    is_closed: bool,
    error_message: Option<String>,
}

impl<R: NoteRepository> NoteEditor<R> {
    pub fn for_new(repository: Arc<R>) -> Self {
        Self {
            repository,
            original: None,
            draft: NoteDraft::default(),
            is_editing: true,
            is_saving: false,
            is_closed: false,
            error_message: None,
        }
    }

    pub fn for_existing(repository: Arc<R>, note: Note) -> Self {
        Self {
            repository,
            draft: NoteDraft::from_note(&note),
            original: Some(note),
            is_editing: false,
            is_saving: false,
            is_closed: false,
            error_message: None,
        }
    }

    pub fn original(&self) -> Option<&Note> {
        self.original.as_ref()
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Whether the save action is currently enabled
    pub fn can_save(&self) -> bool {
        self.is_editing && !self.is_saving && self.draft.is_valid()
    }

    /// Switch an existing note into edit mode.
    pub fn begin_edit(&mut self) {
        if self.original.is_some() {
            self.is_editing = true;
        }
    }

    /// Create or update depending on the flow.
    ///
    /// Returns `None` when the save is rejected by validation or fails; in the
    /// latter case `error_message` holds the reason and the editor stays open.
    pub async fn save(&mut self) -> Option<EditorEvent> {
        if !self.can_save() {
            debug!(title = %self.draft.title, "Save rejected");
            return None;
        }

        self.is_saving = true;
        let event = match self.original.clone() {
            None => self.create().await,
            Some(original) => self.update(&original).await,
        };
        self.is_saving = false;
        event
    }

    async fn create(&mut self) -> Option<EditorEvent> {
        let title = self.draft.trimmed_title().to_string();
        match self.repository.create_note(&title, &self.draft.content).await {
            Ok(note) => {
                info!(note_id = %note.id, "Created note");
                self.is_editing = false;
                self.is_closed = true;
                Some(EditorEvent::Saved(note))
            }
            Err(e) => {
                warn!(error = %e, "Failed to create note");
                self.error_message = Some(format!("Failed to save note: {}", e));
                None
            }
        }
    }

    async fn update(&mut self, original: &Note) -> Option<EditorEvent> {
        // an empty diff is still sent
        let changes = self.draft.diff(original);
        debug!(note_id = %original.id, ?changes, "Updating note");

        match self.repository.update_note(&original.id, changes).await {
            Ok(note) => {
                info!(note_id = %note.id, "Updated note");
                self.draft = NoteDraft::from_note(&note);
                self.original = Some(note.clone());
                self.is_editing = false;
                Some(EditorEvent::Updated(note))
            }
            Err(e) => {
                warn!(note_id = %original.id, error = %e, "Failed to update note");
                self.error_message = Some(format!("Failed to save changes: {}", e));
                None
            }
        }
    }

    /// Delete the note being shown. Only meaningful for an existing note.
    pub async fn delete(&mut self) -> Option<EditorEvent> {
        let id = self.original.as_ref()?.id.clone();
        match self.repository.delete_note(&id).await {
            Ok(()) => {
                info!(note_id = %id, "Deleted note");
                self.is_editing = false;
                self.is_closed = true;
                Some(EditorEvent::Deleted(id))
            }
            Err(e) => {
                warn!(note_id = %id, error = %e, "Failed to delete note");
                self.error_message = Some(format!("Failed to delete note: {}", e));
                None
            }
        }
    }

    /// Drop draft edits without touching the backend.
    pub fn cancel(&mut self) {
        match &self.original {
            Some(note) => self.draft = NoteDraft::from_note(note),
            None => {
                self.draft = NoteDraft::default();
                self.is_closed = true;
            }
        }
        self.is_editing = false;
    }
}
