// src/application/mod.rs
pub mod note_editor;
pub mod note_list;
pub mod repository;

pub use note_editor::{EditorEvent, NoteDraft, NoteEditor};
pub use note_list::NoteListController;
pub use repository::NoteRepository;
