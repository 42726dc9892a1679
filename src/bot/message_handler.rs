//! Message Handler module for incoming text messages and commands

use std::sync::Arc;

use anyhow::Result;
use log::debug;
use teloxide::prelude::*;

use crate::dialogue::BotState;

use super::dialogue_manager::{handle_user_reply, UserReply};
use super::App;

/// Decide whether a message participates in the dialogue.
///
/// Text always does. Non-text messages (stickers, photos, ...) are ignored
/// except at the checkout step, where they re-enter the email handler as an
/// empty reply so the user is asked to type their email as text.
pub fn reply_text(text: Option<&str>, stored: Option<BotState>) -> Option<String> {
    match text {
        Some(text) => Some(text.trim().to_string()),
        None if stored == Some(BotState::AwaitingEmail) => Some(String::new()),
        None => None,
    }
}

/// Handle incoming text messages (commands and checkout email input)
pub async fn message_handler(bot: Bot, msg: Message, app: Arc<App>) -> Result<()> {
    let stored = match msg.text() {
        // Only non-text messages need the stored state to decide anything
        Some(_) => None,
        None => app.sessions.state(msg.chat.id.0).await.unwrap_or(None),
    };
    let Some(text) = reply_text(msg.text(), stored) else {
        return Ok(());
    };

    debug!("Received text message from chat {}", msg.chat.id);

    let user_id = msg.from.as_ref().map(|user| user.id.0 as i64).unwrap_or(msg.chat.id.0);
    let username = msg
        .from
        .as_ref()
        .and_then(|user| user.username.clone())
        .or_else(|| msg.chat.username().map(|name| name.to_string()));

    let reply = UserReply {
        chat_id: msg.chat.id,
        message_id: None,
        text,
        user_id,
        username,
    };

    handle_user_reply(&bot, &app, reply).await;
    Ok(())
}
