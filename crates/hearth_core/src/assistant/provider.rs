//! Text completion provider SPI.

use crate::model::chat::ChatRole;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AssistantResult<T> = Result<T, AssistantError>;

/// What the user asked the assistant to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum AssistantTask {
    Summarize,
    Paraphrase,
    Translate { target_language: String },
    Chat,
}

impl AssistantTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Paraphrase => "paraphrase",
            Self::Translate { .. } => "translate",
            Self::Chat => "chat",
        }
    }
}

/// One prior exchange replayed as chat context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantRequest {
    pub task: AssistantTask,
    /// Fully rendered prompt (see [`build_prompt`]).
    pub prompt: String,
    /// Earlier chat turns, oldest first; empty for one-shot tasks.
    pub history: Vec<ChatTurn>,
}

/// Provider failure envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantError {
    pub provider_id: String,
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl AssistantError {
    pub fn new(
        provider_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}:{}] {}",
            self.provider_id, self.code, self.message
        )
    }
}

impl Error for AssistantError {}

/// Adapter over a remote text model. Plain text in, plain text out.
pub trait AssistantProvider: Send + Sync {
    fn provider_id(&self) -> &str;
    fn complete(&self, request: &AssistantRequest) -> AssistantResult<String>;
}

/// Renders the instruction prompt for a one-shot task or a chat message.
pub fn build_prompt(task: &AssistantTask, text: &str) -> String {
    let text = text.trim();
    match task {
        AssistantTask::Summarize => {
            format!("Summarize the following text in a few concise sentences:\n\n{text}")
        }
        AssistantTask::Paraphrase => format!(
            "Paraphrase the following text, keeping its meaning but using different wording:\n\n{text}"
        ),
        AssistantTask::Translate { target_language } => format!(
            "Translate the following text into {}. Reply with the translation only:\n\n{text}",
            target_language.trim()
        ),
        AssistantTask::Chat => text.to_string(),
    }
}
