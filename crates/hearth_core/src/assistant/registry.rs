//! In-process assistant provider registry and selection.

use crate::assistant::provider::{
    AssistantError, AssistantProvider, AssistantRequest, AssistantResult,
};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantRegistryError {
    InvalidProviderId(String),
    DuplicateProviderId(String),
    ProviderNotFound(String),
}

impl Display for AssistantRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProviderId(value) => write!(f, "provider id is invalid: {value}"),
            Self::DuplicateProviderId(value) => {
                write!(f, "provider id already registered: {value}")
            }
            Self::ProviderNotFound(value) => write!(f, "provider not found: {value}"),
        }
    }
}

impl Error for AssistantRegistryError {}

/// Registered providers plus the one currently selected.
///
/// The first registered provider becomes active automatically.
#[derive(Default, Clone)]
pub struct AssistantRegistry {
    providers: BTreeMap<String, Arc<dyn AssistantProvider>>,
    active_provider_id: Option<String>,
}

impl AssistantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        provider: Arc<dyn AssistantProvider>,
    ) -> Result<(), AssistantRegistryError> {
        let provider_id = provider.provider_id().trim().to_string();
        if !is_valid_provider_id(&provider_id) {
            return Err(AssistantRegistryError::InvalidProviderId(provider_id));
        }
        if self.providers.contains_key(provider_id.as_str()) {
            return Err(AssistantRegistryError::DuplicateProviderId(provider_id));
        }

        if self.active_provider_id.is_none() {
            self.active_provider_id = Some(provider_id.clone());
        }
        self.providers.insert(provider_id, provider);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Sorted provider ids.
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn select_active(&mut self, provider_id: &str) -> Result<(), AssistantRegistryError> {
        let normalized = provider_id.trim();
        if !self.providers.contains_key(normalized) {
            return Err(AssistantRegistryError::ProviderNotFound(
                normalized.to_string(),
            ));
        }
        self.active_provider_id = Some(normalized.to_string());
        Ok(())
    }

    pub fn active_provider_id(&self) -> Option<&str> {
        self.active_provider_id.as_deref()
    }

    /// Sends `request` to the active provider.
    pub fn complete(&self, request: &AssistantRequest) -> AssistantResult<String> {
        let provider = self
            .active_provider_id()
            .and_then(|id| self.providers.get(id))
            .ok_or_else(|| {
                AssistantError::new(
                    "registry",
                    "provider_not_selected",
                    "No assistant provider is configured.",
                    false,
                )
            })?;
        provider.complete(request)
    }
}

fn is_valid_provider_id(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
