//! Test doubles for exchange and handler tests: a recording [`Platform`] and a scripted [`Provider`].

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use conversation::{Conversation, InMemoryConversationStore};
use futures::StreamExt;
use llm_client::{AgentEvent, EventStream, ModelCatalog, Moderator, NoopModerator, Provider, ProviderRegistry, ProviderTag};
use relay_bot::{Exchange, ExchangeRequest, SessionLoader};
use relay_core::{Chat, Message, OutgoingMessage, Platform, RelayError, Result, User};
use reply_stream::StreamConfig;
use std::sync::{Arc, Mutex};

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    SendInitial {
        id: String,
        in_reply_to: Option<String>,
        message: OutgoingMessage,
    },
    Reply {
        id: String,
        previous_id: String,
        message: OutgoingMessage,
    },
    Edit {
        id: String,
        message: OutgoingMessage,
    },
}

/// Platform that assigns ids `1`, `2`, ... and records every send/reply/edit. Typing calls are counted.
#[derive(Default)]
pub struct MockPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    next_id: Mutex<u64>,
    typing: Mutex<usize>,
    fail_sends: bool,
}

#[allow(dead_code)]
impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send/reply/edit fails.
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn typing_count(&self) -> usize {
        *self.typing.lock().unwrap()
    }

    /// Latest content of every message, in creation order.
    pub fn latest_contents(&self) -> Vec<(String, String)> {
        let mut latest: Vec<(String, String)> = Vec::new();
        for call in self.calls() {
            match call {
                PlatformCall::SendInitial { id, message, .. } | PlatformCall::Reply { id, message, .. } => {
                    latest.push((id, message.content))
                }
                PlatformCall::Edit { id, message } => {
                    if let Some(entry) = latest.iter_mut().find(|(known, _)| *known == id) {
                        entry.1 = message.content;
                    }
                }
            }
        }
        latest
    }

    fn next_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        next.to_string()
    }

    fn check(&self) -> Result<()> {
        if self.fail_sends {
            return Err(RelayError::Platform("simulated platform failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn send_initial(
        &self,
        _chat: &Chat,
        in_reply_to: Option<&str>,
        message: OutgoingMessage,
    ) -> Result<String> {
        self.check()?;
        let id = self.next_id();
        self.calls.lock().unwrap().push(PlatformCall::SendInitial {
            id: id.clone(),
            in_reply_to: in_reply_to.map(str::to_string),
            message,
        });
        Ok(id)
    }

    async fn reply(&self, _chat: &Chat, previous_id: &str, message: OutgoingMessage) -> Result<String> {
        self.check()?;
        let id = self.next_id();
        self.calls.lock().unwrap().push(PlatformCall::Reply {
            id: id.clone(),
            previous_id: previous_id.to_string(),
            message,
        });
        Ok(id)
    }

    async fn edit(&self, _chat: &Chat, message_id: &str, message: OutgoingMessage) -> Result<()> {
        self.check()?;
        self.calls.lock().unwrap().push(PlatformCall::Edit {
            id: message_id.to_string(),
            message,
        });
        Ok(())
    }

    async fn send_typing(&self, _chat: &Chat) -> Result<()> {
        *self.typing.lock().unwrap() += 1;
        Ok(())
    }
}

/// Provider that replays a fixed event script and records the conversations it was asked about.
pub struct ScriptedProvider {
    tag: ProviderTag,
    events: Vec<AgentEvent>,
    seen: Mutex<Vec<(String, Conversation)>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new(tag: ProviderTag, events: Vec<AgentEvent>) -> Arc<Self> {
        Arc::new(Self {
            tag,
            events,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<(String, Conversation)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn tag(&self) -> ProviderTag {
        self.tag
    }

    async fn stream(&self, model: &str, conversation: &Conversation) -> EventStream {
        self.seen
            .lock()
            .unwrap()
            .push((model.to_string(), conversation.clone()));
        futures::stream::iter(self.events.clone()).boxed()
    }
}

pub fn chat() -> Chat {
    Chat {
        id: -1001,
        chat_type: "group".to_string(),
    }
}

#[allow(dead_code)]
pub fn request(prompt: &str) -> ExchangeRequest {
    ExchangeRequest {
        chat: chat(),
        trigger_message_id: "100".to_string(),
        prompt: prompt.to_string(),
        author: Some("Alice".to_string()),
        model: None,
        resume_from: None,
        at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
    }
}

#[allow(dead_code)]
pub fn user_message(id: &str, content: &str, reply_to_bot: Option<&str>) -> Message {
    Message {
        id: id.to_string(),
        user: User {
            id: 7,
            username: Some("alice".to_string()),
            first_name: Some("Alice".to_string()),
            last_name: None,
            is_bot: false,
        },
        chat: chat(),
        content: content.to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        reply_to_message_id: reply_to_bot.map(str::to_string),
        reply_to_message_from_bot: reply_to_bot.is_some(),
    }
}

/// Final assistant transcript for a plain answer.
#[allow(dead_code)]
pub fn finish(text: &str) -> AgentEvent {
    AgentEvent::Finish(vec![conversation::ChatMessage::assistant(text)])
}

/// Exchange over the given platform, store and providers, with the no-op moderator and default thresholds.
#[allow(dead_code)]
pub fn exchange(
    platform: Arc<MockPlatform>,
    store: &InMemoryConversationStore,
    providers: Vec<Arc<dyn Provider>>,
) -> Exchange {
    exchange_with_moderator(platform, store, providers, Arc::new(NoopModerator))
}

#[allow(dead_code)]
pub fn exchange_with_moderator(
    platform: Arc<MockPlatform>,
    store: &InMemoryConversationStore,
    providers: Vec<Arc<dyn Provider>>,
    moderator: Arc<dyn Moderator>,
) -> Exchange {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider);
    }
    Exchange::new(
        platform,
        SessionLoader::new(Arc::new(store.clone()), Some("Be helpful.".to_string())),
        registry,
        ModelCatalog::default(),
        moderator,
        StreamConfig::default(),
    )
}
