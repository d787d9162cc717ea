//! One prompt → streamed reply → persisted conversation.
//!
//! # Flow
//!
//! 1. Moderation pre-check of the prompt (a flagged prompt aborts before anything is sent or stored).
//! 2. Open the session (stored by chat and replied-to id, or fresh), resolve the model, route to its provider.
//! 3. Append the user turn, start the typing heartbeat, emit the prompt part.
//! 4. Drive backend events into the synchronizer; text deltas are buffered and flushed as one text
//!    fragment at every step start, tool call, error and finish.
//! 5. On finish, append the backend transcript and persist under the chat and first reply message id.
//!
//! Invocation-level failures are returned as [`RelayError`]; the caller shows `user_message()`.

use chrono::{DateTime, Utc};
use conversation::ChatMessage;
use futures::StreamExt;
use llm_client::{AgentEvent, EventStream, ModelCatalog, Moderator, ProviderRegistry};
use relay_core::{Chat, FailureCause, Platform, RelayError, Result};
use reply_stream::{
    MessageSink, Part, PlatformSink, ReplySynchronizer, StreamConfig, TypingHeartbeat,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::session::SessionLoader;

/// Input of one exchange.
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    pub chat: Chat,
    /// Message that triggered the exchange; the first reply answers it.
    pub trigger_message_id: String,
    pub prompt: String,
    /// Speaker name sent to the model.
    pub author: Option<String>,
    /// Explicit `model:<id>` selection.
    pub model: Option<String>,
    /// Id of the bot message being replied to; selects the stored conversation.
    pub resume_from: Option<String>,
    pub at: DateTime<Utc>,
}

/// What an exchange produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    pub first_message_id: Option<String>,
    pub model: String,
    /// False when the backend stream ended without finishing.
    pub persisted: bool,
}

pub struct Exchange {
    platform: Arc<dyn Platform>,
    sessions: SessionLoader,
    registry: ProviderRegistry,
    catalog: ModelCatalog,
    moderator: Arc<dyn Moderator>,
    stream_config: StreamConfig,
}

impl Exchange {
    pub fn new(
        platform: Arc<dyn Platform>,
        sessions: SessionLoader,
        registry: ProviderRegistry,
        catalog: ModelCatalog,
        moderator: Arc<dyn Moderator>,
        stream_config: StreamConfig,
    ) -> Self {
        Self {
            platform,
            sessions,
            registry,
            catalog,
            moderator,
            stream_config,
        }
    }

    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    #[instrument(skip(self, request), fields(chat_id = request.chat.id, trigger = %request.trigger_message_id))]
    pub async fn run(&self, request: ExchangeRequest) -> Result<ExchangeOutcome> {
        if self.moderator.is_flagged(&request.prompt).await? {
            warn!("Prompt blocked by moderation");
            return Err(RelayError::ModerationBlocked);
        }

        let mut conversation = self
            .sessions
            .open(&request.chat, request.resume_from.as_deref(), request.model.as_deref())
            .await?;
        let model = self.catalog.find(conversation.model.as_deref())?;
        let provider = self.registry.get(model.provider)?;
        conversation.model = Some(model.id.to_string());
        conversation.append_user_turn(request.prompt.clone(), request.author.clone(), request.at);

        info!(model = model.id, provider = %model.provider, history = conversation.len(), "Starting reply stream");

        let sink = PlatformSink::new(
            self.platform.clone(),
            request.chat.clone(),
            Some(request.trigger_message_id.clone()),
        );
        let mut synchronizer = ReplySynchronizer::new(self.stream_config.clone(), sink);

        let platform = self.platform.clone();
        let chat = request.chat.clone();
        let heartbeat = TypingHeartbeat::start(self.stream_config.typing_interval(), move || {
            let platform = platform.clone();
            let chat = chat.clone();
            async move {
                if let Err(e) = platform.send_typing(&chat).await {
                    debug!(error = %e, "Typing indicator failed");
                }
            }
        });

        synchronizer.on_part(Part::prompt(request.prompt.clone())).await?;
        let events = provider.stream(model.id, &conversation).await;
        let transcript = drive(&mut synchronizer, events).await?;
        heartbeat.stop();

        let first_message_id = synchronizer.first_message_id().map(str::to_string);
        let persisted = match (transcript, first_message_id.as_deref()) {
            (Some(transcript), Some(key)) => {
                conversation.append_transcript(transcript);
                self.sessions.save(&request.chat, key, &conversation).await?;
                true
            }
            _ => {
                warn!("Reply did not finish; conversation not persisted");
                false
            }
        };

        Ok(ExchangeOutcome {
            first_message_id,
            model: model.id.to_string(),
            persisted,
        })
    }
}

/// Appends buffered text as one fragment. Whitespace-only buffers are dropped.
async fn flush<S: MessageSink>(
    synchronizer: &mut ReplySynchronizer<S>,
    buffer: &mut String,
) -> Result<()> {
    let text = std::mem::take(buffer);
    if text.trim().is_empty() {
        return Ok(());
    }
    synchronizer.on_part(Part::text(text)).await?;
    Ok(())
}

/// Consumes backend events in order. Returns the transcript on finish, `None` if the stream ended early
/// (a failure part is shown in that case).
pub async fn drive<S: MessageSink>(
    synchronizer: &mut ReplySynchronizer<S>,
    mut events: EventStream,
) -> Result<Option<Vec<ChatMessage>>> {
    let mut buffer = String::new();
    let mut failed = false;

    while let Some(event) = events.next().await {
        debug!(event = event.kind(), "Backend event");
        match event {
            AgentEvent::TextDelta(delta) => buffer.push_str(&delta),
            AgentEvent::StepStart => flush(synchronizer, &mut buffer).await?,
            AgentEvent::ToolCall { name } => {
                flush(synchronizer, &mut buffer).await?;
                synchronizer.on_part(Part::tool(name)).await?;
            }
            AgentEvent::Error(cause) => {
                flush(synchronizer, &mut buffer).await?;
                warn!(category = cause.category(), error = %cause, "Backend reported a failure");
                failed = true;
                synchronizer.on_part(Part::failure(cause)).await?;
            }
            AgentEvent::Finish(transcript) => {
                flush(synchronizer, &mut buffer).await?;
                return Ok(Some(transcript));
            }
        }
    }

    flush(synchronizer, &mut buffer).await?;
    if !failed {
        synchronizer
            .on_part(Part::failure(FailureCause::Other(
                "stream ended before finishing".to_string(),
            )))
            .await?;
    }
    Ok(None)
}
