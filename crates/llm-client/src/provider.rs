//! Provider capability and routing by provider tag.
//!
//! A [`ProviderRegistry`] maps each [`ProviderTag`] to one [`Provider`]. Routing is a table lookup; an
//! unknown tag, or a known tag with no registered provider, fails with `UnsupportedProvider`.

use async_trait::async_trait;
use conversation::Conversation;
use futures::StreamExt;
use relay_core::{FailureCause, RelayError};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::event::{AgentEvent, EventStream};

/// Backend family a model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderTag {
    OpenAi,
    Gemini,
    Claude,
}

impl ProviderTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderTag::OpenAi => "openai",
            ProviderTag::Gemini => "gemini",
            ProviderTag::Claude => "claude",
        }
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderTag {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderTag::OpenAi),
            "gemini" => Ok(ProviderTag::Gemini),
            "claude" => Ok(ProviderTag::Claude),
            _ => Err(RelayError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// One backend implementation.
#[async_trait]
pub trait Provider: Send + Sync {
    fn tag(&self) -> ProviderTag;

    /// Opens a streamed turn for `conversation` on `model`. Failures are delivered as
    /// [`AgentEvent::Error`] events; a stream that ends without [`AgentEvent::Finish`] did not complete.
    async fn stream(&self, model: &str, conversation: &Conversation) -> EventStream;

    /// Runs a turn to completion and returns the concatenated text.
    async fn complete(&self, model: &str, conversation: &Conversation) -> Result<String, FailureCause> {
        let mut events = self.stream(model, conversation).await;
        let mut text = String::new();
        while let Some(event) = events.next().await {
            match event {
                AgentEvent::TextDelta(delta) => text.push_str(&delta),
                AgentEvent::Error(cause) => return Err(cause),
                AgentEvent::Finish(_) => return Ok(text),
                AgentEvent::StepStart | AgentEvent::ToolCall { .. } => {}
            }
        }
        Err(FailureCause::Other("stream ended without finishing".to_string()))
    }
}

/// Lookup table from provider tag to implementation.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderTag, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under its own tag, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.tag(), provider);
    }

    pub fn with(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, tag: ProviderTag) -> Result<Arc<dyn Provider>, RelayError> {
        self.providers
            .get(&tag)
            .cloned()
            .ok_or_else(|| RelayError::UnsupportedProvider(tag.to_string()))
    }

    /// Routes a raw tag string.
    pub fn route(&self, tag: &str) -> Result<Arc<dyn Provider>, RelayError> {
        self.get(tag.parse()?)
    }

    pub fn tags(&self) -> Vec<ProviderTag> {
        let mut tags: Vec<ProviderTag> = self.providers.keys().copied().collect();
        tags.sort_by_key(|t| t.as_str());
        tags
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
