//! SQLite FTS5-based note search.
//!
//! # Responsibility
//! - Provide keyword search over note title and body.
//! - Return typed hits with stable IDs and highlighted snippets.
//!
//! # Invariants
//! - The FTS index is maintained by triggers on `notes`; this module only reads.
//! - Result ordering is deterministic by rank, then `updated_at`, then id.

use crate::db::DbError;
use crate::model::RecordId;
use crate::repo::record_repo::parse_uuid;
use crate::repo::record_repo::RepoError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_LIMIT: u32 = 20;
const SNIPPET_TOKENS: u32 = 12;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug)]
pub enum SearchError {
    /// User-provided query cannot be parsed by FTS5 syntax.
    InvalidQuery {
        query: String,
        message: String,
    },
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchQuery {
    pub text: String,
    pub limit: u32,
    /// Pass `text` through as a raw FTS5 expression.
    ///
    /// Off by default so search-as-you-type never hits syntax errors.
    pub raw_fts_syntax: bool,
}

impl NoteSearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_LIMIT,
            raw_fts_syntax: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchHit {
    pub note_id: RecordId,
    pub title: String,
    /// Body excerpt with matches wrapped in `[` `]`.
    pub snippet: String,
}

/// Searches notes via FTS5 and returns ranked hits.
pub fn search_notes(conn: &Connection, query: &NoteSearchQuery) -> SearchResult<Vec<NoteSearchHit>> {
    let Some(match_expr) = build_match_expression(query) else {
        return Ok(Vec::new());
    };
    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT
            notes.id AS id,
            notes.title AS title,
            snippet(notes_fts, 1, '[', ']', ' ... ', {SNIPPET_TOKENS}) AS snippet
         FROM notes_fts
         JOIN notes ON notes.rowid = notes_fts.rowid
         WHERE notes_fts MATCH ?
         ORDER BY bm25(notes_fts), notes.updated_at DESC, notes.id ASC
         LIMIT ?"
    );
    let binds = vec![
        Value::Text(match_expr.clone()),
        Value::Integer(i64::from(query.limit)),
    ];

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt
        .query(params_from_iter(binds))
        .map_err(|err| map_query_error(err, &match_expr))?;
    let mut hits = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|err| map_query_error(err, &match_expr))?
    {
        hits.push(parse_hit(row)?);
    }
    Ok(hits)
}

fn parse_hit(row: &Row<'_>) -> SearchResult<NoteSearchHit> {
    let id_text: String = row.get("id")?;
    let note_id = parse_uuid(&id_text, "notes").map_err(|err| match err {
        RepoError::InvalidData(message) => SearchError::InvalidData(message),
        other => SearchError::InvalidData(other.to_string()),
    })?;
    Ok(NoteSearchHit {
        note_id,
        title: row.get("title")?,
        snippet: row.get("snippet")?,
    })
}

fn build_match_expression(query: &NoteSearchQuery) -> Option<String> {
    let text = query.text.trim();
    if text.is_empty() {
        return None;
    }
    if query.raw_fts_syntax {
        return Some(text.to_string());
    }

    let terms = text
        .split_whitespace()
        .map(|term| format!("\"{}\"*", term.replace('"', "\"\"")))
        .collect::<Vec<_>>();
    Some(terms.join(" AND "))
}

fn map_query_error(err: rusqlite::Error, query: &str) -> SearchError {
    let is_syntax_error = match &err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    };
    if is_syntax_error {
        return SearchError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }
    SearchError::Db(DbError::Sqlite(err))
}

#[cfg(test)]
mod tests {
    use super::{build_match_expression, NoteSearchQuery};

    #[test]
    fn terms_are_quoted_prefix_matches() {
        let query = NoteSearchQuery::new("  grocery \"list ");
        assert_eq!(
            build_match_expression(&query).as_deref(),
            Some("\"grocery\"* AND \"\"\"list\"*")
        );
    }

    #[test]
    fn blank_query_builds_nothing() {
        assert!(build_match_expression(&NoteSearchQuery::new("   ")).is_none());
    }
}
