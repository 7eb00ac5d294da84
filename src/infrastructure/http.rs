// src/infrastructure/http.rs
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::application::NoteRepository;
use crate::domain::{
    CreateNoteRequest, DomainError, ErrorResponse, Note, NotesResponse, UpdateNoteRequest,
};

/// `NoteRepository` backed by the notes REST API.
///
/// One HTTP request per call. The client is built without a request timeout
/// and nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpNoteRepository {
    client: Client,
    base_url: String,
}

impl HttpNoteRepository {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "Creating HttpNoteRepository");
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn notes_url(&self) -> Result<Url, DomainError> {
        self.url_with(&["notes"])
    }

    /// The id travels as a single percent-encoded path segment.
    fn note_url(&self, id: &str) -> Result<Url, DomainError> {
        self.url_with(&["notes", id])
    }

    fn url_with(&self, segments: &[&str]) -> Result<Url, DomainError> {
        let invalid = |reason: String| {
            DomainError::Transport(format!("invalid base URL '{}': {}", self.base_url, reason))
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn transport(e: reqwest::Error) -> DomainError {
    DomainError::Transport(e.to_string())
}

/// Map non-success statuses to error kinds; `id` names the note for 404s.
async fn check_status(response: Response, id: Option<&str>) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(DomainError::NotFound(id.to_string()));
        }
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => err.error,
        Err(_) if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
        Err(_) => body,
    };
    Err(DomainError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DomainError> {
    let bytes = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes).map_err(|e| DomainError::Decode(e.to_string()))
}

#[async_trait]
impl NoteRepository for HttpNoteRepository {
    #[instrument(level = "debug", skip(self))]
    async fn list_notes(&self) -> Result<Vec<Note>, DomainError> {
        let response = self
            .client
            .get(self.notes_url()?)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response, None).await?;
        let wrapper: NotesResponse = decode(response).await?;
        debug!(count = wrapper.notes.len(), "Decoded notes");
        Ok(wrapper.notes)
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_note(&self, id: &str) -> Result<Note, DomainError> {
        let response = self
            .client
            .get(self.note_url(id)?)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response, Some(id)).await?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self, content))]
    async fn create_note(&self, title: &str, content: &str) -> Result<Note, DomainError> {
        let body = CreateNoteRequest {
            title: title.to_string(),
            content: content.to_string(),
        };
        let response = self
            .client
            .post(self.notes_url()?)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response, None).await?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn update_note(&self, id: &str, changes: UpdateNoteRequest) -> Result<Note, DomainError> {
        let response = self
            .client
            .put(self.note_url(id)?)
            .json(&changes)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response, Some(id)).await?;
        decode(response).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_note(&self, id: &str) -> Result<(), DomainError> {
        let response = self
            .client
            .delete(self.note_url(id)?)
            .send()
            .await
            .map_err(transport)?;
        check_status(response, Some(id)).await?;
        Ok(())
    }
}
