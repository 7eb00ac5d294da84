// src/ports/terminal.rs
use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::constants::PREVIEW_LINES;
use crate::domain::Note;
use crate::util::text::{first_line, preview_lines, relative_time};

/// Plain-text rendering of notes for the terminal
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }

    /// One block per note: id, title and age on the first line, then a short
    /// content preview. Shows an empty-state message when there are no notes.
    pub fn render_list(&self, notes: &[Note], now: DateTime<Utc>) -> String {
        if notes.is_empty() {
            return "No Notes\nCreate your first note to get started\n".to_string();
        }

        let mut out = String::new();
        for note in notes {
            out.push_str(&self.render_row(note, now));
        }
        out
    }

    pub fn render_row(&self, note: &Note, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}\t{}\t({})",
            note.id,
            first_line(&note.title),
            relative_time(&note.updated_at, now)
        );
        for line in preview_lines(&note.content, PREVIEW_LINES) {
            let _ = writeln!(out, "    {}", line);
        }
        out
    }

    pub fn render_detail(&self, note: &Note, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", note.title);
        let _ = writeln!(
            out,
            "Created: {}   Updated: {}",
            note.created_at.format("%Y-%m-%d"),
            relative_time(&note.updated_at, now)
        );
        let _ = writeln!(out);
        if note.content.is_empty() {
            let _ = writeln!(out, "No content");
        } else {
            let _ = writeln!(out, "{}", note.content);
        }
        out
    }
}
