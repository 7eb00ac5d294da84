use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Timelike, Utc};
use notedesk::domain::timestamp::Timestamp;
use notedesk::domain::{
    CreateNoteRequest, ErrorResponse, Note, NotesResponse, UpdateNoteRequest,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
struct Store {
    notes: Vec<Note>,
    next_id: usize,
    update_bodies: Vec<serde_json::Value>,
    raw_list_body: Option<String>,
    reject_deletes: bool,
}

/// In-process notes backend speaking the REST contract on an ephemeral port
#[allow(dead_code)]
pub struct TestBackend {
    pub base_url: String,
    store: Arc<Mutex<Store>>,
}

#[allow(dead_code)]
impl TestBackend {
    pub async fn start() -> Result<Self> {
        let store = Arc::new(Mutex::new(Store::default()));
        let app = Router::new()
            .route("/api/v1/notes", get(list_notes).post(create_note))
            .route(
                "/api/v1/notes/{id}",
                get(get_note).put(update_note).delete(delete_note),
            )
            .with_state(Arc::clone(&store));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test backend")?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}/api/v1", addr),
            store,
        })
    }

    /// Host part suitable for `--host`
    pub fn host(&self) -> String {
        self.base_url
            .trim_start_matches("http://")
            .trim_end_matches("/api/v1")
            .to_string()
    }

    /// Answer GET /notes with this body verbatim
    pub fn serve_raw_list(&self, body: &str) {
        self.store.lock().unwrap().raw_list_body = Some(body.to_string());
    }

    /// Answer every DELETE with 500
    pub fn reject_deletes(&self) {
        self.store.lock().unwrap().reject_deletes = true;
    }

    pub fn notes(&self) -> Vec<Note> {
        self.store.lock().unwrap().notes.clone()
    }

    /// Raw JSON bodies received by PUT, in arrival order
    pub fn update_bodies(&self) -> Vec<serde_json::Value> {
        self.store.lock().unwrap().update_bodies.clone()
    }
}

/// Current time at microsecond precision, as the wire format carries it
fn now() -> Timestamp {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1000 * 1000)
        .expect("truncated nanoseconds stay in range")
        .fixed_offset()
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

type Shared = State<Arc<Mutex<Store>>>;

async fn list_notes(State(store): Shared) -> Response {
    let store = store.lock().unwrap();
    match &store.raw_list_body {
        Some(body) => (
            StatusCode::OK,
            [("content-type", "application/json")],
            body.clone(),
        )
            .into_response(),
        None => Json(NotesResponse {
            notes: store.notes.clone(),
        })
        .into_response(),
    }
}

async fn create_note(State(store): Shared, Json(req): Json<CreateNoteRequest>) -> Response {
    if req.title.is_empty() {
        return error(StatusCode::BAD_REQUEST, "title is required");
    }
    let mut store = store.lock().unwrap();
    store.next_id += 1;
    let created = now();
    let note = Note {
        id: format!("srv-{:04}", store.next_id),
        title: req.title,
        content: req.content,
        created_at: created,
        updated_at: created,
    };
    store.notes.push(note.clone());
    (StatusCode::CREATED, Json(note)).into_response()
}

async fn get_note(State(store): Shared, Path(id): Path<String>) -> Response {
    let store = store.lock().unwrap();
    match store.notes.iter().find(|n| n.id == id) {
        Some(note) => Json(note.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Note not found"),
    }
}

async fn update_note(
    State(store): Shared,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    store.update_bodies.push(body.clone());
    let changes: UpdateNoteRequest = match serde_json::from_value(body) {
        Ok(changes) => changes,
        Err(e) => return error(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    let Some(note) = store.notes.iter_mut().find(|n| n.id == id) else {
        return error(StatusCode::NOT_FOUND, "Note not found");
    };
    if let Some(title) = changes.title {
        note.title = title;
    }
    if let Some(content) = changes.content {
        note.content = content;
    }
    note.updated_at = now().max(note.created_at);
    Json(note.clone()).into_response()
}

async fn delete_note(State(store): Shared, Path(id): Path<String>) -> Response {
    let mut store = store.lock().unwrap();
    if store.reject_deletes {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "database is locked");
    }
    let before = store.notes.len();
    store.notes.retain(|n| n.id != id);
    if store.notes.len() == before {
        return error(StatusCode::NOT_FOUND, "Note not found");
    }
    StatusCode::NO_CONTENT.into_response()
}
