//! OpenAI-compatible streaming provider (async-openai).
//!
//! One implementation serves every [`ProviderTag`]: OpenAI, Gemini and Claude all expose an
//! OpenAI-compatible chat completions endpoint, so only the base URL and key differ. The stream is
//! pumped by a spawned task into an unbounded channel.
//!
//! Opening the stream is retried (up to `max_retries` extra attempts) when the request fails before the
//! first chunk; once content has arrived, a transport error becomes an [`AgentEvent::Error`] and the
//! stream ends without finishing.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionResponseStream, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionStreamResponse,
    },
    Client,
};
use async_trait::async_trait;
use conversation::{ChatMessage, Conversation};
use futures::StreamExt;
use relay_core::FailureCause;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderCredentials;
use crate::event::{AgentEvent, EventStream};
use crate::format::to_request_messages;
use crate::mask::mask_token;
use crate::provider::{Provider, ProviderTag};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Maps an async-openai error onto the failure taxonomy.
pub fn classify_error(err: &OpenAIError) -> FailureCause {
    match err {
        OpenAIError::JSONDeserialize(_) | OpenAIError::InvalidArgument(_) => {
            FailureCause::Validation {
                message: err.to_string(),
            }
        }
        _ => FailureCause::UpstreamCall {
            message: err.to_string(),
        },
    }
}

#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    tag: ProviderTag,
    client: Arc<Client<OpenAIConfig>>,
    masked_key: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiCompatibleProvider {
    pub fn new(tag: ProviderTag, credentials: &ProviderCredentials, max_retries: u32) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(credentials.api_key.clone())
            .with_api_base(credentials.base_url.clone());
        info!(
            provider = %tag,
            base_url = %credentials.base_url,
            api_key = %mask_token(&credentials.api_key),
            "Registered OpenAI-compatible provider"
        );
        Self {
            tag,
            client: Arc::new(Client::with_config(config)),
            masked_key: mask_token(&credentials.api_key),
            max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Base delay between open attempts; attempt `n` waits `n * delay`.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn build_request(
        &self,
        model: &str,
        conversation: &Conversation,
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(to_request_messages(conversation)?)
            .stream(true)
            .build()
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn tag(&self) -> ProviderTag {
        self.tag
    }

    #[instrument(skip(self, conversation), fields(provider = %self.tag, api_key = %self.masked_key))]
    async fn stream(&self, model: &str, conversation: &Conversation) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        info!(
            message_count = conversation.messages.len(),
            "Opening chat completion stream"
        );

        match self.build_request(model, conversation) {
            Ok(request) => {
                let opener = Opener {
                    client: self.client.clone(),
                    max_retries: self.max_retries,
                    retry_delay: self.retry_delay,
                };
                tokio::spawn(async move {
                    if !emit(&tx, AgentEvent::StepStart) {
                        return;
                    }
                    match opener.open(request).await {
                        Ok((stream, first)) => pump(stream, first, &tx).await,
                        Err(cause) => {
                            emit(&tx, AgentEvent::Error(cause));
                        }
                    }
                });
            }
            Err(err) => {
                emit(&tx, AgentEvent::Error(classify_error(&err)));
            }
        }

        UnboundedReceiverStream::new(rx).boxed()
    }
}

struct Opener {
    client: Arc<Client<OpenAIConfig>>,
    max_retries: u32,
    retry_delay: Duration,
}

impl Opener {
    /// Opens the stream and waits for its first item. Retries while the failure happens before any chunk.
    async fn open(
        &self,
        request: CreateChatCompletionRequest,
    ) -> Result<(ChatCompletionResponseStream, Option<CreateChatCompletionStreamResponse>), FailureCause>
    {
        let attempts = self.max_retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            let err = match self.client.chat().create_stream(request.clone()).await {
                Ok(mut stream) => match stream.next().await {
                    Some(Ok(first)) => return Ok((stream, Some(first))),
                    None => return Ok((stream, None)),
                    Some(Err(err)) => err,
                },
                Err(err) => err,
            };

            warn!(attempt, attempts, error = %err, "Chat completion stream failed to open");
            last_error = Some(err);
            if attempt < attempts {
                tokio::time::sleep(self.retry_delay * attempt).await;
            }
        }

        let cause = match last_error {
            Some(err) if self.max_retries == 0 => classify_error(&err),
            Some(err) => FailureCause::RetryExhausted {
                attempts,
                message: err.to_string(),
            },
            None => FailureCause::Other("stream was never opened".to_string()),
        };
        Err(cause)
    }
}

/// Sends one event; false once the consumer is gone.
fn emit(tx: &UnboundedSender<AgentEvent>, event: AgentEvent) -> bool {
    tx.send(event).is_ok()
}

#[derive(Default)]
struct Turn {
    text: String,
    // index -> (name, arguments)
    tool_calls: BTreeMap<i32, (String, String)>,
}

impl Turn {
    fn absorb(&mut self, chunk: CreateChatCompletionStreamResponse, tx: &UnboundedSender<AgentEvent>) -> bool {
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                self.text.push_str(&content);
                if !emit(tx, AgentEvent::TextDelta(content)) {
                    return false;
                }
            }
            for call in choice.delta.tool_calls.unwrap_or_default() {
                let entry = self.tool_calls.entry(call.index).or_default();
                let Some(function) = call.function else {
                    continue;
                };
                if let Some(name) = function.name.filter(|n| !n.is_empty()) {
                    entry.0 = name.clone();
                    if !emit(tx, AgentEvent::ToolCall { name }) {
                        return false;
                    }
                }
                if let Some(arguments) = function.arguments {
                    entry.1.push_str(&arguments);
                }
            }
        }
        true
    }

    fn into_transcript(self) -> Vec<ChatMessage> {
        let mut transcript: Vec<ChatMessage> = self
            .tool_calls
            .into_values()
            .map(|(name, arguments)| ChatMessage::tool(name, arguments))
            .collect();
        if !self.text.is_empty() {
            transcript.push(ChatMessage::assistant(self.text));
        }
        transcript
    }
}

async fn pump(
    mut stream: ChatCompletionResponseStream,
    first: Option<CreateChatCompletionStreamResponse>,
    tx: &UnboundedSender<AgentEvent>,
) {
    let mut turn = Turn::default();
    if let Some(chunk) = first {
        if !turn.absorb(chunk, tx) {
            return;
        }
    }

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                if !turn.absorb(chunk, tx) {
                    debug!("Event consumer dropped; stopping stream");
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "Chat completion stream failed mid-flight");
                emit(tx, AgentEvent::Error(classify_error(&err)));
                return;
            }
        }
    }

    debug!(chars = turn.text.len(), tools = turn.tool_calls.len(), "Stream finished");
    emit(tx, AgentEvent::Finish(turn.into_transcript()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error() {
        let err = OpenAIError::InvalidArgument("bad model".into());
        assert!(matches!(classify_error(&err), FailureCause::Validation { .. }));

        let err = OpenAIError::StreamError("connection reset".into());
        assert!(matches!(classify_error(&err), FailureCause::UpstreamCall { .. }));
    }

    #[test]
    fn test_transcript_lists_tools_before_text() {
        let mut turn = Turn::default();
        turn.text.push_str("done");
        turn.tool_calls.insert(1, ("MathTool".into(), "{\"x\":2}".into()));
        turn.tool_calls.insert(0, ("WebResearchTool".into(), "{}".into()));

        let transcript = turn.into_transcript();
        let names: Vec<Option<&str>> = transcript.iter().map(|m| m.name.as_deref()).collect();
        assert_eq!(names, vec![Some("WebResearchTool"), Some("MathTool"), None]);
        assert_eq!(transcript[2].content, "done");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_exhausts_retries() {
        let credentials = ProviderCredentials {
            api_key: "sk-test-0000000000000000".into(),
            base_url: "http://127.0.0.1:9/v1".into(),
        };
        let provider = OpenAiCompatibleProvider::new(ProviderTag::OpenAi, &credentials, 1)
            .with_retry_delay(Duration::from_millis(1));
        let mut conversation = Conversation::default();
        conversation.append_user_turn("hi", None, chrono::Utc::now());

        let events: Vec<AgentEvent> = provider.stream("gpt-4o", &conversation).await.collect().await;
        assert_eq!(events.first(), Some(&AgentEvent::StepStart));
        assert!(matches!(
            events.last(),
            Some(AgentEvent::Error(FailureCause::RetryExhausted { attempts: 2, .. }))
        ));
        assert!(!events.iter().any(|e| matches!(e, AgentEvent::Finish(_))));
    }
}
