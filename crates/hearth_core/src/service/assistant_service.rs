//! Text assistant use-case service.
//!
//! # Responsibility
//! - Validate user text and render prompts for the active provider.
//! - Persist chat exchanges and replay recent history as context.
//!
//! # Invariants
//! - Blank input fails with a validation error before any provider call.
//! - A chat exchange is persisted only once the provider has replied, so
//!   stored history always alternates user/assistant.

use crate::assistant::provider::{
    build_prompt, AssistantError, AssistantRequest, AssistantTask, ChatTurn,
};
use crate::assistant::registry::AssistantRegistry;
use crate::model::chat::{ChatMessage, ChatRole};
use crate::model::require_text;
use crate::repo::record_repo::{RecordQuery, Repository};
use crate::service::{load_into, settle, ServiceError, ServiceResult};
use crate::state::StateHolder;
use log::{info, warn};
use std::sync::Arc;

/// Most recent messages replayed to the provider as chat context.
pub const CHAT_CONTEXT_MESSAGES: usize = 20;

pub struct AssistantService<R: Repository<ChatMessage>> {
    repo: R,
    registry: AssistantRegistry,
    state: Arc<StateHolder<ChatMessage>>,
}

impl<R: Repository<ChatMessage>> AssistantService<R> {
    pub fn new(repo: R, registry: AssistantRegistry) -> Self {
        Self {
            repo,
            registry,
            state: Arc::new(StateHolder::new()),
        }
    }

    pub fn state(&self) -> Arc<StateHolder<ChatMessage>> {
        Arc::clone(&self.state)
    }

    pub fn registry(&self) -> &AssistantRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AssistantRegistry {
        &mut self.registry
    }

    pub fn summarize(&self, text: &str) -> ServiceResult<String> {
        self.one_shot(AssistantTask::Summarize, text)
    }

    pub fn paraphrase(&self, text: &str) -> ServiceResult<String> {
        self.one_shot(AssistantTask::Paraphrase, text)
    }

    pub fn translate(&self, text: &str, target_language: &str) -> ServiceResult<String> {
        require_text("target_language", target_language)?;
        self.one_shot(
            AssistantTask::Translate {
                target_language: target_language.trim().to_string(),
            },
            text,
        )
    }

    /// Sends `message` with recent history; returns the stored reply.
    pub fn chat(&self, message: &str) -> ServiceResult<ChatMessage> {
        let result = require_text("message", message)
            .map_err(ServiceError::from)
            .and_then(|()| self.exchange(message.trim()));
        settle(&self.state, "assistant_service", result, || self.history())
    }

    /// Full chat history, oldest first.
    pub fn history(&self) -> ServiceResult<Vec<ChatMessage>> {
        Ok(self.repo.list(&RecordQuery::all())?)
    }

    pub fn load_history(&self) -> ServiceResult<Vec<ChatMessage>> {
        load_into(&self.state, || self.history())
    }

    /// Deletes every stored chat message; returns how many were removed.
    pub fn clear_history(&self) -> ServiceResult<usize> {
        let result = self.history().and_then(|messages| {
            for message in &messages {
                self.repo.delete(message.meta.id)?;
            }
            Ok(messages.len())
        });
        settle(&self.state, "assistant_service", result, || self.history())
    }

    fn one_shot(&self, task: AssistantTask, text: &str) -> ServiceResult<String> {
        require_text("text", text)?;
        let request = AssistantRequest {
            prompt: build_prompt(&task, text),
            task,
            history: Vec::new(),
        };
        self.complete(&request)
    }

    fn exchange(&self, message: &str) -> ServiceResult<ChatMessage> {
        let history = self.history()?;
        let skip = history.len().saturating_sub(CHAT_CONTEXT_MESSAGES);
        let turns = history
            .into_iter()
            .skip(skip)
            .map(|stored| ChatTurn {
                role: stored.role,
                content: stored.content,
            })
            .collect();
        let request = AssistantRequest {
            task: AssistantTask::Chat,
            prompt: build_prompt(&AssistantTask::Chat, message),
            history: turns,
        };
        let reply_text = self.complete(&request)?;

        let mut user = ChatMessage::new(ChatRole::User, message);
        self.repo.insert(&mut user)?;
        let mut reply = ChatMessage::new(ChatRole::Assistant, reply_text);
        self.repo.insert(&mut reply)?;
        Ok(reply)
    }

    fn complete(&self, request: &AssistantRequest) -> ServiceResult<String> {
        let outcome = self.registry.complete(request).and_then(|reply| {
            if reply.trim().is_empty() {
                return Err(AssistantError::new(
                    self.registry.active_provider_id().unwrap_or("registry"),
                    "empty_reply",
                    "The assistant returned an empty reply.",
                    true,
                ));
            }
            Ok(reply)
        });
        match outcome {
            Ok(reply) => {
                info!(
                    "event=assistant_complete module=service status=ok task={} reply_chars={}",
                    request.task.as_str(),
                    reply.chars().count()
                );
                Ok(reply)
            }
            Err(err) => {
                warn!(
                    "event=assistant_complete module=service status=error task={} provider={} code={} retryable={}",
                    request.task.as_str(),
                    err.provider_id,
                    err.code,
                    err.retryable
                );
                Err(ServiceError::Provider(err))
            }
        }
    }
}
