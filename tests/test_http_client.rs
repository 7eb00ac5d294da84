mod helpers;

use anyhow::Result;
use helpers::TestBackend;
use notedesk::application::NoteRepository;
use notedesk::domain::{DomainError, UpdateNoteRequest};
use notedesk::infrastructure::HttpNoteRepository;
use serde_json::json;

async fn setup() -> Result<(TestBackend, HttpNoteRepository)> {
    let backend = TestBackend::start().await?;
    let repo = HttpNoteRepository::new(backend.base_url.clone());
    Ok((backend, repo))
}

#[tokio::test]
async fn given_create_request_when_creating_then_returns_server_assigned_note() -> Result<()> {
    // Arrange
    let (backend, repo) = setup().await?;

    // Act
    let note = repo.create_note("Groceries", "").await?;

    // Assert
    assert!(!note.id.is_empty());
    assert_eq!(note.title, "Groceries");
    assert_eq!(note.content, "");
    assert_eq!(note.created_at, note.updated_at);
    assert_eq!(backend.notes(), vec![note]);
    Ok(())
}

#[tokio::test]
async fn given_created_notes_when_listing_then_returns_all_in_server_order() -> Result<()> {
    // Arrange
    let (_backend, repo) = setup().await?;
    let first = repo.create_note("First", "one").await?;
    let second = repo.create_note("Second", "two").await?;

    // Act
    let notes = repo.list_notes().await?;

    // Assert
    assert_eq!(notes, vec![first, second]);
    for note in &notes {
        assert!(note.updated_at >= note.created_at);
    }
    Ok(())
}

#[tokio::test]
async fn given_empty_backend_when_listing_then_returns_empty() -> Result<()> {
    let (_backend, repo) = setup().await?;

    let notes = repo.list_notes().await?;

    assert!(notes.is_empty());
    Ok(())
}

#[tokio::test]
async fn given_content_only_change_when_updating_then_title_is_absent_from_payload() -> Result<()> {
    // Arrange
    let (backend, repo) = setup().await?;
    let note = repo.create_note("A", "B").await?;

    // Act
    let updated = repo
        .update_note(
            &note.id,
            UpdateNoteRequest {
                title: None,
                content: Some("C".to_string()),
            },
        )
        .await?;

    // Assert
    assert_eq!(backend.update_bodies(), vec![json!({"content": "C"})]);
    assert_eq!(updated.title, "A");
    assert_eq!(updated.content, "C");
    assert!(updated.updated_at >= note.updated_at);
    Ok(())
}

#[tokio::test]
async fn given_empty_update_when_updating_then_sends_empty_object_and_keeps_fields() -> Result<()> {
    // Arrange
    let (backend, repo) = setup().await?;
    let note = repo.create_note("A", "B").await?;

    // Act
    let updated = repo.update_note(&note.id, UpdateNoteRequest::default()).await?;

    // Assert
    assert_eq!(backend.update_bodies(), vec![json!({})]);
    assert_eq!(updated.id, note.id);
    assert_eq!(updated.title, note.title);
    assert_eq!(updated.content, note.content);
    assert_eq!(updated.created_at, note.created_at);
    assert!(updated.updated_at >= updated.created_at);
    Ok(())
}

#[tokio::test]
async fn given_unknown_id_when_updating_then_returns_not_found() -> Result<()> {
    let (_backend, repo) = setup().await?;

    let result = repo.update_note("missing", UpdateNoteRequest::default()).await;

    assert_eq!(result, Err(DomainError::NotFound("missing".to_string())));
    Ok(())
}

#[tokio::test]
async fn given_existing_note_when_fetching_then_returns_it() -> Result<()> {
    let (_backend, repo) = setup().await?;
    let note = repo.create_note("Title", "Body").await?;

    let fetched = repo.get_note(&note.id).await?;

    assert_eq!(fetched, note);
    Ok(())
}

#[tokio::test]
async fn given_existing_note_when_deleting_then_backend_forgets_it() -> Result<()> {
    // Arrange
    let (backend, repo) = setup().await?;
    let note = repo.create_note("Doomed", "").await?;

    // Act
    repo.delete_note(&note.id).await?;

    // Assert
    assert!(backend.notes().is_empty());
    let again = repo.delete_note(&note.id).await;
    assert_eq!(again, Err(DomainError::NotFound(note.id.clone())));
    Ok(())
}

#[tokio::test]
async fn given_id_with_fragment_marker_when_deleting_then_other_note_survives() -> Result<()> {
    // Arrange
    let (backend, repo) = setup().await?;
    let note = repo.create_note("Keep me", "").await?;
    let lookalike = format!("{}#not-this", note.id);

    // Act
    let result = repo.delete_note(&lookalike).await;

    // Assert
    assert_eq!(result, Err(DomainError::NotFound(lookalike)));
    assert_eq!(backend.notes(), vec![note]);
    Ok(())
}

#[tokio::test]
async fn given_id_with_path_separator_when_fetching_then_returns_not_found() -> Result<()> {
    let (_backend, repo) = setup().await?;
    let note = repo.create_note("Keep me", "").await?;
    let lookalike = format!("{}/../{}", note.id, note.id);

    let result = repo.get_note(&lookalike).await;

    assert_eq!(result, Err(DomainError::NotFound(lookalike)));
    Ok(())
}

#[tokio::test]
async fn given_server_error_when_deleting_then_returns_rejected_with_message() -> Result<()> {
    let (backend, repo) = setup().await?;
    let note = repo.create_note("Kept", "").await?;
    backend.reject_deletes();

    let result = repo.delete_note(&note.id).await;

    assert_eq!(
        result,
        Err(DomainError::Rejected {
            status: 500,
            message: "database is locked".to_string(),
        })
    );
    assert_eq!(backend.notes().len(), 1);
    Ok(())
}

#[tokio::test]
async fn given_blank_title_when_creating_then_backend_rejection_is_surfaced() -> Result<()> {
    let (_backend, repo) = setup().await?;

    let result = repo.create_note("", "body").await;

    assert!(matches!(result, Err(DomainError::Rejected { status: 400, .. })));
    Ok(())
}

#[tokio::test]
async fn given_unparseable_timestamp_when_listing_then_returns_decode_error() -> Result<()> {
    let (backend, repo) = setup().await?;
    backend.serve_raw_list(
        r#"{"notes":[{"id":"1","title":"t","content":"","created_at":"2025-06-30 09:00","updated_at":"2025-06-30 09:00"}]}"#,
    );

    let result = repo.list_notes().await;

    assert!(matches!(result, Err(DomainError::Decode(_))));
    Ok(())
}

#[tokio::test]
async fn given_wrong_schema_when_listing_then_returns_decode_error() -> Result<()> {
    let (backend, repo) = setup().await?;
    backend.serve_raw_list(r#"[{"id":"1"}]"#);

    let result = repo.list_notes().await;

    assert!(matches!(result, Err(DomainError::Decode(_))));
    Ok(())
}

#[tokio::test]
async fn given_backend_wire_timestamps_when_listing_then_decodes_offsets() -> Result<()> {
    let (backend, repo) = setup().await?;
    backend.serve_raw_list(
        r#"{"notes":[{"id":"1","title":"t","content":"","created_at":"2025-06-30T09:00:00.123456+0200","updated_at":"2025-06-30T07:30:00.000000+0000"}]}"#,
    );

    let notes = repo.list_notes().await?;

    assert_eq!(notes.len(), 1);
    // 09:00 at +0200 is 07:00 UTC, before the update
    assert!(notes[0].updated_at > notes[0].created_at);
    Ok(())
}

#[tokio::test]
async fn given_closed_port_when_listing_then_returns_transport_error() -> Result<()> {
    // Arrange: grab a free port, then release it
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    let repo = HttpNoteRepository::new(format!("http://{}/api/v1", addr));

    // Act
    let result = repo.list_notes().await;

    // Assert
    assert!(matches!(result, Err(DomainError::Transport(_))));
    Ok(())
}
