//! Conversation state machine for the shop dialogue.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z0-9]+$").unwrap());

/// The step a user is currently on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotState {
    #[default]
    Start,
    HandleMenu,
    HandleDescription,
    HandleCart,
    AwaitingEmail,
}

/// Select the state whose handler should process this reply.
///
/// Global commands and cart/checkout buttons override whatever state is
/// stored; everything else falls back to the stored state, defaulting to
/// `Start` for first-time users.
pub fn route_reply(user_reply: &str, stored: Option<BotState>) -> BotState {
    if user_reply == "/start" {
        BotState::Start
    } else if user_reply == "back_to_menu" {
        BotState::HandleDescription
    } else if user_reply == "my_cart" || user_reply.starts_with("remove_item:") {
        BotState::HandleCart
    } else if user_reply == "pay" {
        BotState::AwaitingEmail
    } else {
        stored.unwrap_or_default()
    }
}

/// Validates a contact email entered at checkout
pub fn validate_email(input: &str) -> Result<String, &'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if !EMAIL_RE.is_match(trimmed) {
        return Err("invalid");
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        // Valid addresses
        assert!(validate_email("fish@example.com").is_ok());
        assert!(validate_email("  angler@sea.io  ").is_ok());

        // Invalid addresses
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("two words@example.com").is_err());
        assert!(validate_email("missing@extension").is_err());
    }

    #[test]
    fn test_email_trimming() {
        let result = validate_email("  fish@example.com  ");
        assert_eq!(result.unwrap(), "fish@example.com");
    }

    #[test]
    fn test_global_replies_override_stored_state() {
        assert_eq!(route_reply("/start", Some(BotState::HandleCart)), BotState::Start);
        assert_eq!(
            route_reply("back_to_menu", Some(BotState::HandleCart)),
            BotState::HandleDescription
        );
        assert_eq!(route_reply("my_cart", Some(BotState::Start)), BotState::HandleCart);
        assert_eq!(
            route_reply("remove_item:abc", Some(BotState::Start)),
            BotState::HandleCart
        );
        assert_eq!(route_reply("pay", Some(BotState::HandleCart)), BotState::AwaitingEmail);
    }

    #[test]
    fn test_unknown_reply_falls_back_to_stored_state() {
        assert_eq!(
            route_reply("some-document-id", Some(BotState::HandleMenu)),
            BotState::HandleMenu
        );
        assert_eq!(route_reply("some-document-id", None), BotState::Start);
    }
}
