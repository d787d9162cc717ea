//! Backend event stream shape.

use conversation::ChatMessage;
use futures::stream::BoxStream;
use relay_core::FailureCause;

/// One event of a streamed agent turn, in backend order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// A new model step begins (after a tool round-trip, or at the very start).
    StepStart,
    TextDelta(String),
    ToolCall { name: String },
    /// A part-level failure. The stream may continue after it.
    Error(FailureCause),
    /// The turn completed; carries the backend's transcript of assistant and tool records.
    Finish(Vec<ChatMessage>),
}

impl AgentEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AgentEvent::StepStart => "step-start",
            AgentEvent::TextDelta(_) => "text-delta",
            AgentEvent::ToolCall { .. } => "tool-call",
            AgentEvent::Error(_) => "error",
            AgentEvent::Finish(_) => "finish",
        }
    }
}

/// Ordered, single-consumer stream of [`AgentEvent`]s.
pub type EventStream = BoxStream<'static, AgentEvent>;
