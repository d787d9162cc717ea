//! Inbound trigger detection: `/llm` commands and replies to bot messages.
//!
//! - **Command**: `/llm [model:<id>] <prompt>` or `/llm@<botname> ...`. Starts a fresh conversation.
//! - **Reply to a bot message**: the message text is the prompt; the replied-to id selects the stored
//!   conversation to continue.

use relay_core::{HandlerError, Message};

pub const COMMAND: &str = "/llm";
const MODEL_PREFIX: &str = "model:";

/// How the exchange was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKind {
    Command,
    ReplyToBot { replied_to: String },
}

/// A message that asks the bot for an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub prompt: String,
    /// Model explicitly selected with `model:<id>`.
    pub model: Option<String>,
}

impl Trigger {
    /// Id of the message whose stored conversation this turn continues.
    pub fn resume_from(&self) -> Option<&str> {
        match &self.kind {
            TriggerKind::Command => None,
            TriggerKind::ReplyToBot { replied_to } => Some(replied_to),
        }
    }
}

/// Splits `/llm`, `/llm@bot` from the rest. `None` if the text is not this command or is addressed to
/// another bot.
fn strip_command<'a>(text: &'a str, bot_username: Option<&str>) -> Option<&'a str> {
    let rest = text.strip_prefix(COMMAND)?;
    if let Some(addressed) = rest.strip_prefix('@') {
        let end = addressed
            .find(char::is_whitespace)
            .unwrap_or(addressed.len());
        let (target, rest) = addressed.split_at(end);
        return match bot_username {
            Some(me) if !target.eq_ignore_ascii_case(me) => None,
            _ => Some(rest),
        };
    }
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

/// Pulls a leading `model:<id>` token off the argument text.
fn split_model(args: &str) -> (Option<String>, &str) {
    let args = args.trim_start();
    match args.strip_prefix(MODEL_PREFIX) {
        Some(rest) => {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (id, prompt) = rest.split_at(end);
            let model = Some(id.to_string()).filter(|s| !s.is_empty());
            (model, prompt)
        }
        None => (None, args),
    }
}

/// Detects a trigger in `message`.
///
/// `Ok(None)` when the message is not for the bot; `Err(EmptyPrompt)` for a command without a prompt.
/// Replies to the bot without text are ignored.
pub fn parse_trigger(
    message: &Message,
    bot_username: Option<&str>,
) -> Result<Option<Trigger>, HandlerError> {
    let text = message.content.trim();

    if let Some(args) = strip_command(text, bot_username) {
        let (model, prompt) = split_model(args);
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(HandlerError::EmptyPrompt);
        }
        return Ok(Some(Trigger {
            kind: TriggerKind::Command,
            prompt: prompt.to_string(),
            model,
        }));
    }

    match (&message.reply_to_message_id, message.reply_to_message_from_bot) {
        (Some(replied_to), true) if !text.is_empty() => Ok(Some(Trigger {
            kind: TriggerKind::ReplyToBot {
                replied_to: replied_to.clone(),
            },
            prompt: text.to_string(),
            model: None,
        })),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use relay_core::{Chat, User};

    fn message(content: &str, reply_to_bot: Option<&str>) -> Message {
        Message {
            id: "10".to_string(),
            user: User {
                id: 1,
                username: Some("alice".to_string()),
                first_name: Some("Alice".to_string()),
                last_name: None,
                is_bot: false,
            },
            chat: Chat {
                id: -100,
                chat_type: "group".to_string(),
            },
            content: content.to_string(),
            created_at: Utc::now(),
            reply_to_message_id: reply_to_bot.map(str::to_string),
            reply_to_message_from_bot: reply_to_bot.is_some(),
        }
    }

    #[test]
    fn test_plain_command() {
        let trigger = parse_trigger(&message("/llm Explain recursion", None), None)
            .unwrap()
            .unwrap();
        assert_eq!(trigger.kind, TriggerKind::Command);
        assert_eq!(trigger.prompt, "Explain recursion");
        assert_eq!(trigger.model, None);
        assert_eq!(trigger.resume_from(), None);
    }

    #[test]
    fn test_command_with_model_and_mention() {
        let trigger = parse_trigger(
            &message("/llm@relay_bot model:gemini-2.0-flash  what is new?", None),
            Some("Relay_Bot"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(trigger.model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(trigger.prompt, "what is new?");
    }

    #[test]
    fn test_command_for_other_bot_is_ignored() {
        let parsed = parse_trigger(&message("/llm@other_bot hi", None), Some("relay_bot"));
        assert_eq!(parsed.unwrap(), None);
    }

    #[test]
    fn test_similar_command_is_not_a_trigger() {
        assert_eq!(parse_trigger(&message("/llms hi", None), None).unwrap(), None);
        assert_eq!(parse_trigger(&message("hello /llm", None), None).unwrap(), None);
    }

    #[test]
    fn test_empty_prompt_is_rejected() {
        assert!(matches!(
            parse_trigger(&message("/llm", None), None),
            Err(HandlerError::EmptyPrompt)
        ));
        assert!(matches!(
            parse_trigger(&message("/llm model:gpt-4o   ", None), None),
            Err(HandlerError::EmptyPrompt)
        ));
    }

    #[test]
    fn test_reply_to_bot() {
        let trigger = parse_trigger(&message("and in Rust?", Some("555")), None)
            .unwrap()
            .unwrap();
        assert_eq!(trigger.resume_from(), Some("555"));
        assert_eq!(trigger.prompt, "and in Rust?");
    }

    #[test]
    fn test_reply_to_human_or_without_text_is_ignored() {
        let mut to_human = message("thanks", Some("555"));
        to_human.reply_to_message_from_bot = false;
        assert_eq!(parse_trigger(&to_human, None).unwrap(), None);

        assert_eq!(parse_trigger(&message("   ", Some("555")), None).unwrap(), None);
        assert_eq!(parse_trigger(&message("just chatting", None), None).unwrap(), None);
    }
}
