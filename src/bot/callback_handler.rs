//! Callback Handler module for processing inline keyboard callback queries

use std::sync::Arc;

use anyhow::Result;
use log::debug;
use teloxide::prelude::*;

use super::dialogue_manager::{handle_user_reply, UserReply};
use super::App;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(bot: Bot, q: CallbackQuery, app: Arc<App>) -> Result<()> {
    debug!("Received callback query from user {}", q.from.id);

    if let Some(data) = q.data.clone() {
        let (chat_id, message_id) = match q.message.as_ref() {
            Some(message) => (message.chat().id, Some(message.id())),
            // Inaccessible origin: fall back to the private chat with the user
            None => (ChatId(q.from.id.0 as i64), None),
        };

        let reply = UserReply {
            chat_id,
            message_id,
            text: data,
            user_id: q.from.id.0 as i64,
            username: q.from.username.clone(),
        };

        handle_user_reply(&bot, &app, reply).await;
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}
