// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use application::{EditorEvent, NoteEditor, NoteListController, NoteRepository};
use chrono::Utc;
use infrastructure::{Config, HttpNoteRepository};
use ports::TerminalPresenter;
use tracing::{debug, info};

use crate::cli::args::{Args, Command};

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting notedesk with arguments");

    // Initialize infrastructure
    let config = Config::resolve(args.config.as_deref(), args.host.as_deref())
        .context("Failed to load configuration")?;
    let base_url = config.base_url();
    info!(%base_url, "Using notes backend");
    let repository = Arc::new(HttpNoteRepository::new(base_url));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(args.command, repository, &mut out).await
}

/// Run one command against `repository`, writing user-facing output to `out`.
pub async fn execute<R, W>(command: Command, repository: Arc<R>, out: &mut W) -> Result<()>
where
    R: NoteRepository + 'static,
    W: Write,
{
    let presenter = TerminalPresenter::new();
    let mut list = NoteListController::new(Arc::clone(&repository));

    match command {
        Command::List { json } => {
            list.reload().await;
            if let Some(message) = list.error_message() {
                bail!("{}", message);
            }
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(list.notes())?)?;
            } else {
                write!(out, "{}", presenter.render_list(list.notes(), Utc::now()))?;
            }
        }

        Command::Show { note_id, json } => {
            let note = repository
                .get_note(&note_id)
                .await
                .with_context(|| format!("Failed to load note {}", note_id))?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&note)?)?;
            } else {
                write!(out, "{}", presenter.render_detail(&note, Utc::now()))?;
            }
        }

        Command::Add { title, content } => {
            let mut editor = NoteEditor::for_new(Arc::clone(&repository));
            editor.set_title(title);
            editor.set_content(content);
            if !editor.can_save() {
                bail!("Title must not be empty");
            }

            let event = editor.save().await.ok_or_else(|| editor_failure(&editor))?;
            if let EditorEvent::Saved(note) = &event {
                writeln!(out, "Created note {}", note.id)?;
            }
            notify_list(&mut list, &event).await;
        }

        Command::Edit {
            note_id,
            title,
            content,
        } => {
            let note = repository
                .get_note(&note_id)
                .await
                .with_context(|| format!("Failed to load note {}", note_id))?;
            let mut editor = NoteEditor::for_existing(Arc::clone(&repository), note);
            editor.begin_edit();
            if let Some(title) = title {
                editor.set_title(title);
            }
            if let Some(content) = content {
                editor.set_content(content);
            }
            if !editor.can_save() {
                bail!("Title must not be empty");
            }

            let event = editor.save().await.ok_or_else(|| editor_failure(&editor))?;
            if let EditorEvent::Updated(note) = &event {
                writeln!(out, "Updated note {}", note.id)?;
            }
            notify_list(&mut list, &event).await;
        }

        Command::Delete { mut note_ids } => {
            let mut seen = HashSet::new();
            note_ids.retain(|id| seen.insert(id.clone()));

            list.reload().await;
            if let Some(message) = list.error_message() {
                bail!("{}", message);
            }

            let mut missing = Vec::new();
            for id in &note_ids {
                match list.position_of(id) {
                    Some(index) => {
                        list.delete_at(index);
                    }
                    None => missing.push(id.clone()),
                }
            }

            let failed = list.settle().await;
            for id in note_ids
                .iter()
                .filter(|id| !missing.contains(id) && !failed.contains(id))
            {
                writeln!(out, "Deleted note {}", id)?;
            }

            let mut problems = Vec::new();
            if !missing.is_empty() {
                problems.push(format!("not found: {}", missing.join(", ")));
            }
            if !failed.is_empty() {
                let reason = list.error_message().unwrap_or("Failed to delete note");
                problems.push(format!("{} ({})", reason, failed.join(", ")));
            }
            if !problems.is_empty() {
                bail!("{}", problems.join("; "));
            }
        }
    }

    Ok(())
}

fn editor_failure<R: NoteRepository>(editor: &NoteEditor<R>) -> anyhow::Error {
    anyhow!(
        "{}",
        editor.error_message().unwrap_or("Save was rejected")
    )
}

/// Reload the list after an editor reported a change.
async fn notify_list<R: NoteRepository + 'static>(
    list: &mut NoteListController<R>,
    event: &EditorEvent,
) {
    debug!(?event, "Editor event, reloading list");
    list.reload().await;
    if let Some(message) = list.error_message() {
        debug!(%message, "Reload after editor event failed");
    }
}
