//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Handles incoming text messages and commands
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `dialogue_manager`: Routes replies by conversation state and runs the per-state handlers
//! - `ui_builder`: Creates keyboards and formats messages

pub mod callback_handler;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

pub use dialogue_manager::{handle_user_reply, UserReply};

use crate::cms::CmsClient;
use crate::session::SessionStore;

/// Shared application state injected into every handler
pub struct App {
    pub cms: CmsClient,
    pub sessions: SessionStore,
}
