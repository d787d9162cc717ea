//! Content moderation pre-check run on the user turn before it reaches any backend.

use async_openai::{config::OpenAIConfig, types::CreateModerationRequestArgs, Client};
use async_trait::async_trait;
use relay_core::FailureCause;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::config::ProviderCredentials;
use crate::openai::classify_error;

pub const MODERATION_MODEL: &str = "omni-moderation-latest";

#[async_trait]
pub trait Moderator: Send + Sync {
    /// True when `text` must not be processed.
    async fn is_flagged(&self, text: &str) -> Result<bool, FailureCause>;
}

/// Moderator that lets everything through (moderation disabled).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopModerator;

#[async_trait]
impl Moderator for NoopModerator {
    async fn is_flagged(&self, _text: &str) -> Result<bool, FailureCause> {
        Ok(false)
    }
}

/// OpenAI moderations endpoint.
#[derive(Clone)]
pub struct OpenAiModerator {
    client: Arc<Client<OpenAIConfig>>,
}

impl OpenAiModerator {
    pub fn new(credentials: &ProviderCredentials) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(credentials.api_key.clone())
            .with_api_base(credentials.base_url.clone());
        Self {
            client: Arc::new(Client::with_config(config)),
        }
    }
}

#[async_trait]
impl Moderator for OpenAiModerator {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn is_flagged(&self, text: &str) -> Result<bool, FailureCause> {
        let request = CreateModerationRequestArgs::default()
            .model(MODERATION_MODEL)
            .input(text)
            .build()
            .map_err(|e| classify_error(&e))?;

        let response = self
            .client
            .moderations()
            .create(request)
            .await
            .map_err(|e| classify_error(&e))?;

        let flagged = response.results.iter().any(|r| r.flagged);
        if flagged {
            warn!(results = response.results.len(), "Moderation flagged the text");
        }
        Ok(flagged)
    }
}
