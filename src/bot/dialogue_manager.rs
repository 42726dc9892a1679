//! Dialogue Manager module: routes each reply by conversation state and
//! runs the per-state handlers.
//!
//! Every handler returns the next `BotState`, which is written back to the
//! session store after the side effects complete. Handler failures are
//! caught at this seam, logged, and mapped to a generic retry message so a
//! bad update never takes the process down.

use anyhow::Result;
use log::{error, info, warn};
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode};

use crate::cart::cart_lines;
use crate::cms::Order;
use crate::cms_errors::CmsError;
use crate::dialogue::{route_reply, validate_email, BotState};

use super::ui_builder::{
    create_cart_error_keyboard, create_cart_keyboard, create_menu_keyboard,
    create_product_keyboard, format_cart_message, format_product_caption,
};
use super::App;

const TRY_AGAIN_TEXT: &str = "Something went wrong. Please try again later.";
const CATALOG_UNAVAILABLE_TEXT: &str =
    "Sorry, our products are temporarily unavailable. Please try again later.";

/// A normalized inbound reply: either a text message or a callback press
#[derive(Clone, Debug)]
pub struct UserReply {
    pub chat_id: ChatId,
    /// Message the reply originated from, deleted after re-rendering menus
    pub message_id: Option<MessageId>,
    /// Command text or callback data
    pub text: String,
    pub user_id: i64,
    pub username: Option<String>,
}

/// Entry point shared by the message and callback handlers
pub async fn handle_user_reply(bot: &Bot, app: &App, reply: UserReply) {
    if let Err(err) = dispatch(bot, app, &reply).await {
        error!("Failed to handle reply for chat {}: {err:?}", reply.chat_id);
        let _ = bot.send_message(reply.chat_id, TRY_AGAIN_TEXT).await;
    }
}

async fn dispatch(bot: &Bot, app: &App, reply: &UserReply) -> Result<()> {
    let stored = app.sessions.state(reply.chat_id.0).await?;
    let state = route_reply(&reply.text, stored);

    let next = match state {
        BotState::Start => start(bot, app, reply).await?,
        BotState::HandleMenu => handle_menu(bot, app, reply).await?,
        BotState::HandleDescription => handle_description(bot, app, reply).await?,
        BotState::HandleCart => handle_cart(bot, app, reply).await?,
        BotState::AwaitingEmail => handle_email(bot, app, reply).await?,
    };

    app.sessions.set_state(reply.chat_id.0, next).await?;
    Ok(())
}

/// Send the catalog keyboard, or an apology when the CMS is down or empty
async fn send_catalog(bot: &Bot, app: &App, reply: &UserReply, greeting: &str) -> Result<BotState> {
    let products = match app.cms.list_products().await {
        Ok(products) => products,
        Err(err) => {
            error!("Failed to list products: {err}");
            bot.send_message(reply.chat_id, CATALOG_UNAVAILABLE_TEXT).await?;
            return Ok(BotState::Start);
        }
    };

    if products.is_empty() {
        bot.send_message(reply.chat_id, CATALOG_UNAVAILABLE_TEXT).await?;
        return Ok(BotState::Start);
    }

    bot.send_message(reply.chat_id, greeting)
        .reply_markup(create_menu_keyboard(&products))
        .await?;

    // Drop the message the user navigated from, keeping one active menu
    if let Some(old) = reply.message_id {
        let _ = bot.delete_message(reply.chat_id, old).await;
    }

    Ok(BotState::HandleMenu)
}

async fn start(bot: &Bot, app: &App, reply: &UserReply) -> Result<BotState> {
    info!("Showing catalog to chat {}", reply.chat_id);
    send_catalog(
        bot,
        app,
        reply,
        "Welcome to the fish shop! 🐟\nPick a product for details:",
    )
    .await
}

/// The reply carries a product document id chosen from the catalog
async fn handle_menu(bot: &Bot, app: &App, reply: &UserReply) -> Result<BotState> {
    let document_id = reply.text.as_str();

    let product = match app.cms.get_product(document_id).await {
        Ok(product) => product,
        Err(err) => {
            error!("Failed to fetch product {document_id}: {err}");
            bot.send_message(
                reply.chat_id,
                "There was a problem loading this product. Please try again later.",
            )
            .await?;
            return Ok(BotState::HandleMenu);
        }
    };

    let caption = format_product_caption(&product);
    let keyboard = create_product_keyboard(&product);

    // Prefer a photo message; fall back to text when the picture is missing
    // or cannot be downloaded
    let mut sent_photo = false;
    if let Some(picture_url) = &product.picture_url {
        match app.cms.download_image(picture_url).await {
            Ok(bytes) => {
                bot.send_photo(reply.chat_id, InputFile::memory(bytes))
                    .caption(caption.clone())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard.clone())
                    .await?;
                sent_photo = true;
            }
            Err(err) => warn!("Failed to download picture for {document_id}: {err}"),
        }
    }
    if !sent_photo {
        bot.send_message(reply.chat_id, caption)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;
    }

    if let Some(old) = reply.message_id {
        let _ = bot.delete_message(reply.chat_id, old).await;
    }

    Ok(BotState::HandleDescription)
}

async fn handle_description(bot: &Bot, app: &App, reply: &UserReply) -> Result<BotState> {
    if let Some(document_id) = reply.text.strip_prefix("add_to_cart:") {
        let mut cart = app.sessions.cart(reply.chat_id.0).await?;
        cart.add(document_id, 1);
        app.sessions.set_cart(reply.chat_id.0, &cart).await?;
        info!(
            "Added product {document_id} to cart of chat {} ({} line(s))",
            reply.chat_id,
            cart.len()
        );

        bot.send_message(reply.chat_id, "🛒 Added to your cart!").await?;
        return Ok(BotState::HandleDescription);
    }

    // back_to_menu or anything else: show the catalog again
    send_catalog(bot, app, reply, "🐟 Pick a product for details:").await
}

async fn handle_cart(bot: &Bot, app: &App, reply: &UserReply) -> Result<BotState> {
    if let Some(document_id) = reply.text.strip_prefix("remove_item:") {
        let mut cart = app.sessions.cart(reply.chat_id.0).await?;
        cart.remove(document_id);
        app.sessions.set_cart(reply.chat_id.0, &cart).await?;
        info!("Removed product {document_id} from cart of chat {}", reply.chat_id);
        bot.send_message(reply.chat_id, "Item removed.").await?;
    }

    let cart = app.sessions.cart(reply.chat_id.0).await?;
    let (text, keyboard) = match app.cms.list_products().await {
        Ok(products) => {
            let lines = cart_lines(&cart, &products);
            (format_cart_message(&lines), create_cart_keyboard(&lines))
        }
        Err(err) => {
            error!("Failed to load catalog for cart of chat {}: {err}", reply.chat_id);
            (
                "Could not load your cart. Please try again later.".to_string(),
                create_cart_error_keyboard(),
            )
        }
    };

    bot.send_message(reply.chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;

    if let Some(old) = reply.message_id {
        let _ = bot.delete_message(reply.chat_id, old).await;
    }

    Ok(BotState::HandleCart)
}

async fn handle_email(bot: &Bot, app: &App, reply: &UserReply) -> Result<BotState> {
    // The checkout button itself routes here; prompt before validating
    if reply.text == "pay" {
        let cart = app.sessions.cart(reply.chat_id.0).await?;
        if cart.is_empty() {
            bot.send_message(reply.chat_id, "🧺 Your cart is empty.").await?;
            return Ok(BotState::HandleCart);
        }

        bot.send_message(reply.chat_id, "Please enter your email address:").await?;
        return Ok(BotState::AwaitingEmail);
    }

    let email = match validate_email(&reply.text) {
        Ok(email) => email,
        Err("empty") => {
            bot.send_message(reply.chat_id, "Please type your email as a text message:")
                .await?;
            return Ok(BotState::AwaitingEmail);
        }
        Err(_) => {
            bot.send_message(
                reply.chat_id,
                "That does not look like an email address. Try again:",
            )
            .await?;
            return Ok(BotState::AwaitingEmail);
        }
    };

    let cart = app.sessions.cart(reply.chat_id.0).await?;
    let order = Order::from_cart(reply.user_id, reply.username.clone(), email.clone(), &cart);

    match app.cms.create_order(&order).await {
        Ok(()) => {}
        Err(err @ CmsError::Unreachable(_)) | Err(err @ CmsError::Status(_)) => {
            error!("Failed to create order for chat {}: {err}", reply.chat_id);
            bot.send_message(
                reply.chat_id,
                "Could not submit your order. Please try again later.",
            )
            .await?;
            return Ok(BotState::AwaitingEmail);
        }
        Err(err) => {
            error!("Failed to create order for chat {}: {err}", reply.chat_id);
            bot.send_message(reply.chat_id, TRY_AGAIN_TEXT).await?;
            return Ok(BotState::AwaitingEmail);
        }
    }

    app.sessions.clear_cart(reply.chat_id.0).await?;
    bot.send_message(
        reply.chat_id,
        format!("Thank you! We will contact you at {email}."),
    )
    .await?;

    Ok(BotState::Start)
}
