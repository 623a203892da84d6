//! Free-form note model.
//!
//! `preview_text` and `preview_image` are projections derived from `content`
//! by the note service; callers never set them directly.

use super::{RecordMeta, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    /// Markdown body.
    pub content: String,
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::new(),
            title: title.into(),
            content: content.into(),
            preview_text: None,
            preview_image: None,
        }
    }

    /// A note needs either a title or a body.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            return Err(ValidationError::BlankField("title"));
        }
        Ok(())
    }
}
