//! Conversation → OpenAI-compatible request messages.

use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use chrono::{DateTime, Utc};
use conversation::{ChatMessage, Conversation, Role};

/// Base instruction used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant answering questions in a group chat. Answer in the language of the question.";

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// System instruction for a fresh conversation: the configured prompt plus the current date and time.
pub fn system_instruction(base: Option<&str>, now: DateTime<Utc>) -> String {
    format!(
        "{}\n\nCurrent date and time: {}",
        base.unwrap_or(DEFAULT_SYSTEM_PROMPT),
        now.format(DATETIME_FORMAT)
    )
}

/// Text sent for a user turn. Turns with an author name carry the speaker and time in front of the query.
pub fn annotate_user_turn(message: &ChatMessage) -> String {
    let Some(name) = message.name.as_deref() else {
        return message.content.clone();
    };
    let datetime = message
        .datetime
        .map(|d| d.format(DATETIME_FORMAT).to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "User Name: {}\nDatetime: {}\nQuery: {}",
        name, datetime, message.content
    )
}

/// Builds the request message list: system instruction first, then history in order. Tool records are
/// replayed as assistant notes since the original tool call ids are not kept.
pub fn to_request_messages(
    conversation: &Conversation,
) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
    let mut messages = Vec::with_capacity(conversation.messages.len() + 1);

    if let Some(system) = conversation.system_instruction.as_deref() {
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()?
                .into(),
        );
    }

    for message in &conversation.messages {
        let request: ChatCompletionRequestMessage = match message.role {
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(annotate_user_turn(message))
                .build()?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.clone())
                .build()?
                .into(),
            Role::Tool => ChatCompletionRequestAssistantMessageArgs::default()
                .content(format!(
                    "[{}] {}",
                    message.name.as_deref().unwrap_or("tool"),
                    message.content
                ))
                .build()?
                .into(),
        };
        messages.push(request);
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_user_turn_with_author_is_annotated() {
        let message = ChatMessage::user("What is Rust?", Some("Alice".into()), at_noon());
        assert_eq!(
            annotate_user_turn(&message),
            "User Name: Alice\nDatetime: 2025-03-01T12:00:00Z\nQuery: What is Rust?"
        );
    }

    #[test]
    fn test_user_turn_without_author_is_verbatim() {
        let message = ChatMessage::user("What is Rust?", None, at_noon());
        assert_eq!(annotate_user_turn(&message), "What is Rust?");
    }

    #[test]
    fn test_system_instruction_carries_datetime() {
        let text = system_instruction(Some("Be brief."), at_noon());
        assert!(text.starts_with("Be brief."));
        assert!(text.ends_with("2025-03-01T12:00:00Z"));
        assert!(system_instruction(None, at_noon()).starts_with(DEFAULT_SYSTEM_PROMPT));
    }

    #[test]
    fn test_request_messages_order_and_roles() {
        let mut conversation = Conversation::new(None, Some("sys".into()));
        conversation.append_user_turn("hi", Some("Bob".into()), at_noon());
        conversation.append_transcript(vec![
            ChatMessage::tool("MathTool", "42"),
            ChatMessage::assistant("The answer is 42."),
        ]);

        let messages = to_request_messages(&conversation).unwrap();
        let json = serde_json::to_value(&messages).unwrap();
        let roles: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "assistant"]);
        assert_eq!(json[2]["content"], "[MathTool] 42");
        assert!(json[1]["content"].as_str().unwrap().contains("User Name: Bob"));
    }
}
