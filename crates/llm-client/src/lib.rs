//! # llm-client
//!
//! Backend collaborator for the relay: a [`Provider`] produces an ordered stream of [`AgentEvent`]s for a
//! [`conversation::Conversation`]; a [`ProviderRegistry`] routes by [`ProviderTag`]; [`ModelCatalog`]
//! resolves model ids; [`Moderator`] pre-checks user text.
//!
//! [`OpenAiCompatibleProvider`] implements all three provider tags against OpenAI-compatible endpoints.

pub mod config;
pub mod event;
pub mod format;
mod mask;
pub mod models;
pub mod moderation;
pub mod openai;
pub mod provider;

use std::sync::Arc;

pub use config::{EnvLlmConfig, ProviderCredentials};
pub use event::{AgentEvent, EventStream};
pub use format::{annotate_user_turn, system_instruction, to_request_messages};
pub use mask::mask_token;
pub use models::{ModelCatalog, ModelInfo};
pub use moderation::{Moderator, NoopModerator, OpenAiModerator};
pub use openai::OpenAiCompatibleProvider;
pub use provider::{Provider, ProviderRegistry, ProviderTag};

/// Registers one [`OpenAiCompatibleProvider`] for every provider whose key is configured.
pub fn build_registry(config: &EnvLlmConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for tag in [ProviderTag::OpenAi, ProviderTag::Gemini, ProviderTag::Claude] {
        if let Some(credentials) = config.credentials(tag) {
            registry.register(Arc::new(OpenAiCompatibleProvider::new(
                tag,
                credentials,
                config.max_retries,
            )));
        }
    }
    registry
}

/// OpenAI moderation when enabled and an OpenAI key is present; otherwise a pass-through.
pub fn build_moderator(config: &EnvLlmConfig) -> Arc<dyn Moderator> {
    match (config.moderation_enabled, config.openai.as_ref()) {
        (true, Some(credentials)) => Arc::new(OpenAiModerator::new(credentials)),
        _ => Arc::new(NoopModerator),
    }
}
