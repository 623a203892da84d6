//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/update/get/list/delete APIs.
//! - Derive markdown preview projections (`preview_text`, `preview_image`).
//! - Route keyword search through the FTS index.
//!
//! # Invariants
//! - `update` uses full title/content replacement semantics.
//! - Preview projections are recomputed on every write, never edited directly.
//! - Note list is always sorted by `updated_at DESC, id ASC`.

use crate::model::note::Note;
use crate::model::RecordId;
use crate::repo::record_repo::{RecordQuery, Repository, SqliteRepository};
use crate::search::fts::{search_notes, NoteSearchHit, NoteSearchQuery};
use crate::service::{load_into, settle, ServiceError, ServiceResult};
use crate::state::StateHolder;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

const PREVIEW_TEXT_MAX_CHARS: usize = 100;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)\s]+)[^)]*\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!|]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Markdown-derived preview projection for notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownPreview {
    /// Plain summary text.
    pub preview_text: Option<String>,
    /// First markdown image path.
    pub preview_image: Option<String>,
}

/// Note service over the SQLite repository.
///
/// Bound to SQLite rather than any [`Repository`] because search reads the
/// FTS index on the same connection.
pub struct NoteService<'conn> {
    repo: SqliteRepository<'conn, Note>,
    state: Arc<StateHolder<Note>>,
}

impl<'conn> NoteService<'conn> {
    pub fn new(repo: SqliteRepository<'conn, Note>) -> Self {
        Self {
            repo,
            state: Arc::new(StateHolder::new()),
        }
    }

    pub fn state(&self) -> Arc<StateHolder<Note>> {
        Arc::clone(&self.state)
    }

    pub fn create(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> ServiceResult<Note> {
        let mut note = Note::new(title, content);
        apply_preview(&mut note);
        let result = self
            .repo
            .insert(&mut note)
            .map(|_| note)
            .map_err(ServiceError::from);
        self.settle(result)
    }

    /// Replaces title and content and recomputes the preview.
    pub fn update(
        &self,
        id: RecordId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> ServiceResult<Note> {
        let title = title.into();
        let content = content.into();
        let result = self.require(id).and_then(|mut note| {
            note.title = title;
            note.content = content;
            apply_preview(&mut note);
            self.repo.update(&mut note)?;
            Ok(note)
        });
        self.settle(result)
    }

    pub fn delete(&self, id: RecordId) -> ServiceResult<()> {
        let result = self.repo.delete(id).map_err(ServiceError::from);
        self.settle(result)
    }

    pub fn get(&self, id: RecordId) -> ServiceResult<Option<Note>> {
        Ok(self.repo.get(id)?)
    }

    pub fn list(&self) -> ServiceResult<Vec<Note>> {
        load_into(&self.state, || self.list_all())
    }

    /// Ranked keyword search; the matching notes are published in rank order.
    pub fn search(&self, text: &str, limit: u32) -> ServiceResult<Vec<NoteSearchHit>> {
        let mut query = NoteSearchQuery::new(text);
        query.limit = limit;

        let hits = match search_notes(self.repo.connection(), &query) {
            Ok(hits) => hits,
            Err(err) => {
                let err = ServiceError::from(err);
                self.state.publish_error(err.to_string());
                return Err(err);
            }
        };
        load_into(&self.state, || {
            let mut notes = Vec::with_capacity(hits.len());
            for hit in &hits {
                if let Some(note) = self.repo.get(hit.note_id)? {
                    notes.push(note);
                }
            }
            Ok(notes)
        })?;
        Ok(hits)
    }

    fn list_all(&self) -> ServiceResult<Vec<Note>> {
        Ok(self.repo.list(&RecordQuery::all())?)
    }

    fn require(&self, id: RecordId) -> ServiceResult<Note> {
        self.repo.get(id)?.ok_or(ServiceError::NotFound(id))
    }

    fn settle<V>(&self, result: ServiceResult<V>) -> ServiceResult<V> {
        settle(&self.state, "note_service", result, || self.list_all())
    }
}

fn apply_preview(note: &mut Note) {
    let preview = derive_markdown_preview(&note.content);
    note.preview_text = preview.preview_text;
    note.preview_image = preview.preview_image;
}

/// Derives note preview fields from markdown content.
///
/// Rules:
/// - `preview_image`: first markdown image path.
/// - `preview_text`: images dropped, links reduced to their label, markdown
///   symbols removed, whitespace collapsed, first 100 chars retained.
pub fn derive_markdown_preview(content: &str) -> MarkdownPreview {
    let preview_image = MARKDOWN_IMAGE_RE
        .captures(content)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|value| !value.is_empty());

    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    let preview_text =
        (!trimmed.is_empty()).then(|| trimmed.chars().take(PREVIEW_TEXT_MAX_CHARS).collect());

    MarkdownPreview {
        preview_text,
        preview_image,
    }
}

#[cfg(test)]
mod tests {
    use super::derive_markdown_preview;

    #[test]
    fn preview_extracts_first_image_path() {
        let preview = derive_markdown_preview("x ![a](one.png \"cover\") y ![b](two.png)");
        assert_eq!(preview.preview_image.as_deref(), Some("one.png"));
    }

    #[test]
    fn preview_keeps_link_labels_and_drops_symbols() {
        let source = "# Groceries\n\n- [market](https://example.com)\n**milk** `eggs`";
        let preview = derive_markdown_preview(source);
        let text = preview.preview_text.expect("preview_text should exist");
        assert_eq!(text, "Groceries market milk eggs");
    }

    #[test]
    fn preview_is_truncated_by_chars() {
        let source = "é".repeat(150);
        let text = derive_markdown_preview(&source)
            .preview_text
            .expect("preview_text should exist");
        assert_eq!(text.chars().count(), 100);
    }

    #[test]
    fn image_only_note_has_no_preview_text() {
        let preview = derive_markdown_preview("![](cat.jpg)");
        assert_eq!(preview.preview_text, None);
        assert_eq!(preview.preview_image.as_deref(), Some("cat.jpg"));
    }
}
