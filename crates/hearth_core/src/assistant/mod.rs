//! Cloud text-AI integration contracts.
//!
//! # Responsibility
//! - Define the request/response contract for text completion providers.
//! - Hold registered providers and route calls to the active one.
//!
//! # Invariants
//! - The core never performs network I/O itself; providers are host adapters.
//! - Provider failures surface as [`AssistantError`] envelopes, never panics.

pub mod provider;
pub mod registry;

pub use provider::{
    build_prompt, AssistantError, AssistantProvider, AssistantRequest, AssistantResult,
    AssistantTask, ChatTurn,
};
pub use registry::{AssistantRegistry, AssistantRegistryError};
