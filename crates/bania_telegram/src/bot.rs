//! Bot commands.

use crate::models::{InlineKeyboardButton, InlineKeyboardMarkup, SendMessage, Update, WebAppInfo};

pub const START_TEXT: &str =
    "Welcome to Bania Booking!\n\nClick the button below to book your session.";

pub const HELP_TEXT: &str = "Bania Booking Bot\n\n\
Use this bot to book your bania sessions.\n\n\
Commands:\n\
/start - Start booking\n\
/help - Show this message";

pub const BOOK_BUTTON_TEXT: &str = "Book a Session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
}

/// Command at the start of a message. Accepts `/start`, `/start <payload>`
/// and `/start@SomeBot`.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    match name {
        "start" => Some(BotCommand::Start),
        "help" => Some(BotCommand::Help),
        _ => None,
    }
}

/// The reply to send for an update, if any.
pub fn reply_for(update: &Update, webapp_url: &str) -> Option<SendMessage> {
    let message = update.message.as_ref()?;
    let command = parse_command(message.text.as_deref()?)?;
    let chat_id = message.chat.id;

    Some(match command {
        BotCommand::Start => SendMessage {
            reply_markup: Some(InlineKeyboardMarkup {
                inline_keyboard: vec![vec![InlineKeyboardButton {
                    text: BOOK_BUTTON_TEXT.to_string(),
                    web_app: Some(WebAppInfo {
                        url: webapp_url.to_string(),
                    }),
                }]],
            }),
            ..SendMessage::text(chat_id, START_TEXT)
        },
        BotCommand::Help => SendMessage::text(chat_id, HELP_TEXT),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(text: &str) -> Update {
        serde_json::from_value(json!({
            "update_id": 1,
            "message": { "message_id": 10, "chat": { "id": 42, "type": "private" }, "text": text }
        }))
        .unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("/start"), Some(BotCommand::Start));
        assert_eq!(parse_command("/start ref123"), Some(BotCommand::Start));
        assert_eq!(parse_command("/help@BaniaBot"), Some(BotCommand::Help));
        assert_eq!(parse_command("hello /start"), None);
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn start_opens_the_mini_app() {
        let reply = reply_for(&update("/start"), "https://app.example.com").unwrap();
        assert_eq!(reply.chat_id, 42);
        assert_eq!(reply.text, START_TEXT);
        let body = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            body["reply_markup"],
            json!({ "inline_keyboard": [[{ "text": "Book a Session", "web_app": { "url": "https://app.example.com" } }]] })
        );
    }

    #[test]
    fn help_is_plain_text() {
        let reply = reply_for(&update("/help"), "").unwrap();
        assert!(reply.reply_markup.is_none());
        assert!(reply.text.contains("/start - Start booking"));
        let body = serde_json::to_value(&reply).unwrap();
        assert!(body.get("reply_markup").is_none());
    }

    #[test]
    fn ignores_other_updates() {
        assert!(reply_for(&update("hi"), "").is_none());
        let no_message: Update = serde_json::from_value(json!({ "update_id": 2 })).unwrap();
        assert!(reply_for(&no_message, "").is_none());
    }
}
