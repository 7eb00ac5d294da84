// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use chrono::TimeDelta;
use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::NoteRepository;
use crate::domain::timestamp::{self, Timestamp};
use crate::domain::{DomainError, Note, UpdateNoteRequest};

/// Creation time given to every note the mock creates.
pub const MOCK_EPOCH: &str = "2025-06-30T09:00:00.000000+0000";

/// Build a note the way the backend would return it, for use in tests.
pub fn sample_note(id: &str, title: &str, content: &str) -> Note {
    let created_at = mock_epoch();
    Note {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        created_at,
        updated_at: created_at,
    }
}

fn mock_epoch() -> Timestamp {
    timestamp::parse(MOCK_EPOCH).expect("MOCK_EPOCH must match the wire format")
}

#[derive(Default)]
struct MockState {
    notes: Vec<Note>,
    next_id: usize,
    clock: i64,
    update_calls: Vec<(String, UpdateNoteRequest)>,
    delete_calls: Vec<String>,
    create_calls: Vec<(String, String)>,
}

/// In-memory stand-in for the notes backend
///
/// Behaves like the real service (server-assigned ids, sparse updates,
/// `updated_at` advancing on each write) and can be told to fail specific
/// operations. All calls are recorded for later inspection.
///
/// # Examples
///
/// ```
/// use notedesk::util::testing::{sample_note, MockNoteRepository};
/// use notedesk::domain::DomainError;
///
/// let mock = MockNoteRepository::builder()
///     .with_note(sample_note("a", "First", ""))
///     .with_delete_failure("a", DomainError::Transport("connection reset".into()))
///     .build();
/// ```
pub struct MockNoteRepository {
    state: Mutex<MockState>,
    list_failure: Option<DomainError>,
    create_failure: Option<DomainError>,
    update_failure: Option<DomainError>,
    delete_failures: HashMap<String, DomainError>,
    delete_panics: HashSet<String>,
}

impl MockNoteRepository {
    pub fn builder() -> MockNoteRepositoryBuilder {
        MockNoteRepositoryBuilder::new()
    }

    /// Notes currently held by the fake backend
    pub fn stored_notes(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    pub fn update_calls(&self) -> Vec<(String, UpdateNoteRequest)> {
        self.lock().update_calls.clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.lock().delete_calls.clone()
    }

    pub fn create_calls(&self) -> Vec<(String, String)> {
        self.lock().create_calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }
}

impl MockState {
    fn tick(&mut self) -> Timestamp {
        self.clock += 1;
        mock_epoch() + TimeDelta::seconds(self.clock)
    }
}

#[async_trait]
impl NoteRepository for MockNoteRepository {
    async fn list_notes(&self) -> Result<Vec<Note>, DomainError> {
        if let Some(err) = &self.list_failure {
            return Err(err.clone());
        }
        Ok(self.lock().notes.clone())
    }

    async fn get_note(&self, id: &str) -> Result<Note, DomainError> {
        self.lock()
            .notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(id.to_string()))
    }

    async fn create_note(&self, title: &str, content: &str) -> Result<Note, DomainError> {
        let mut state = self.lock();
        state
            .create_calls
            .push((title.to_string(), content.to_string()));
        if let Some(err) = &self.create_failure {
            return Err(err.clone());
        }

        state.next_id += 1;
        let now = state.tick();
        let note = Note {
            id: format!("note-{}", state.next_id),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: &str, changes: UpdateNoteRequest) -> Result<Note, DomainError> {
        let mut state = self.lock();
        state.update_calls.push((id.to_string(), changes.clone()));
        if let Some(err) = &self.update_failure {
            return Err(err.clone());
        }

        let now = state.tick();
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| DomainError::NotFound(id.to_string()))?;
        if let Some(title) = changes.title {
            note.title = title;
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        note.updated_at = now;
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &str) -> Result<(), DomainError> {
        // before locking, so the state mutex is not poisoned
        if self.delete_panics.contains(id) {
            panic!("simulated crash while deleting {id}");
        }
        let mut state = self.lock();
        state.delete_calls.push(id.to_string());
        if let Some(err) = self.delete_failures.get(id) {
            return Err(err.clone());
        }

        let before = state.notes.len();
        state.notes.retain(|n| n.id != id);
        if state.notes.len() == before {
            return Err(DomainError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Builder for MockNoteRepository
///
/// Provides a fluent interface for configuring mock behavior.
pub struct MockNoteRepositoryBuilder {
    notes: Vec<Note>,
    list_failure: Option<DomainError>,
    create_failure: Option<DomainError>,
    update_failure: Option<DomainError>,
    delete_failures: HashMap<String, DomainError>,
    delete_panics: HashSet<String>,
}

impl MockNoteRepositoryBuilder {
    pub fn new() -> Self {
        Self {
            notes: vec![],
            list_failure: None,
            create_failure: None,
            update_failure: None,
            delete_failures: HashMap::new(),
            delete_panics: HashSet::new(),
        }
    }

    /// Seed the fake backend with a note; list order follows insertion order
    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    /// Make every list_notes call fail
    pub fn with_list_failure(mut self, err: DomainError) -> Self {
        self.list_failure = Some(err);
        self
    }

    pub fn with_create_failure(mut self, err: DomainError) -> Self {
        self.create_failure = Some(err);
        self
    }

    pub fn with_update_failure(mut self, err: DomainError) -> Self {
        self.update_failure = Some(err);
        self
    }

    /// Make delete_note fail for a specific ID
    pub fn with_delete_failure(mut self, id: &str, err: DomainError) -> Self {
        self.delete_failures.insert(id.to_string(), err);
        self
    }

    /// Make delete_note panic for a specific ID
    pub fn with_delete_panic(mut self, id: &str) -> Self {
        self.delete_panics.insert(id.to_string());
        self
    }

    pub fn build(self) -> MockNoteRepository {
        MockNoteRepository {
            state: Mutex::new(MockState {
                notes: self.notes,
                ..Default::default()
            }),
            list_failure: self.list_failure,
            create_failure: self.create_failure,
            update_failure: self.update_failure,
            delete_failures: self.delete_failures,
            delete_panics: self.delete_panics,
        }
    }
}

impl Default for MockNoteRepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "hyper_util", "reqwest", "mio", "axum"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
