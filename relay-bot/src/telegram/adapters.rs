use relay_core::{Chat, Message, ToCoreMessage, ToCoreUser, User};
use teloxide::types::UserId;

/// Telegram user → core user.
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
            is_bot: self.0.is_bot,
        }
    }
}

/// True when `author` is this bot. Without a known bot id (get_me failed), any bot author counts.
fn is_own_message(author: Option<&teloxide::types::User>, bot_id: Option<UserId>) -> bool {
    match (author, bot_id) {
        (Some(user), Some(id)) => user.id == id,
        (Some(user), None) => user.is_bot,
        (None, _) => false,
    }
}

/// Telegram message → core message, including the replied-to message id and whether this bot
/// (identified by its user id from get_me) sent it.
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message, pub Option<UserId>);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let replied = self.0.reply_to_message();
        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                    is_bot: false,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: format!("{:?}", self.0.chat.kind),
            },
            content: self.0.text().unwrap_or("").to_string(),
            created_at: self.0.date,
            reply_to_message_id: replied.map(|m| m.id.to_string()),
            reply_to_message_from_bot: replied
                .map(|m| is_own_message(m.from.as_ref(), self.1))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telegram_user(id: u64, is_bot: bool, last_name: Option<&str>) -> teloxide::types::User {
        teloxide::types::User {
            id: teloxide::types::UserId(id),
            is_bot,
            first_name: "Test".to_string(),
            last_name: last_name.map(str::to_string),
            username: Some("testuser".to_string()),
            language_code: Some("en".to_string()),
            is_premium: false,
            added_to_attachment_menu: false,
        }
    }

    /// **Test: all user fields, including the bot flag, are carried over.**
    #[test]
    fn test_telegram_user_wrapper_to_core() {
        let user = telegram_user(123, false, Some("User"));
        let core_user = TelegramUserWrapper(&user).to_core();

        assert_eq!(core_user.id, 123);
        assert_eq!(core_user.username, Some("testuser".to_string()));
        assert_eq!(core_user.first_name, Some("Test".to_string()));
        assert_eq!(core_user.last_name, Some("User".to_string()));
        assert!(!core_user.is_bot);
        assert_eq!(core_user.display_name(), "Test User");
    }

    #[test]
    fn test_telegram_bot_user_is_flagged() {
        let user = telegram_user(456, true, None);
        let core_user = TelegramUserWrapper(&user).to_core();

        assert!(core_user.is_bot);
        assert_eq!(core_user.last_name, None);
    }

    /// **Test: only replies to this bot's own messages count as replies to the bot.**
    ///
    /// Setup: this bot has id 900; another bot has id 901.
    /// Expected: own message → true; other bot → false; human → false; unknown bot id falls back to is_bot.
    #[test]
    fn test_is_own_message_compares_bot_id() {
        let own = telegram_user(900, true, None);
        let other_bot = telegram_user(901, true, None);
        let human = telegram_user(123, false, None);
        let bot_id = Some(UserId(900));

        assert!(is_own_message(Some(&own), bot_id));
        assert!(!is_own_message(Some(&other_bot), bot_id));
        assert!(!is_own_message(Some(&human), bot_id));
        assert!(!is_own_message(None, bot_id));

        assert!(is_own_message(Some(&other_bot), None));
        assert!(!is_own_message(Some(&human), None));
    }
}
