//! # Fish Shop Telegram Bot
//!
//! A Telegram bot for a small fish shop: browse the catalog served by a
//! Strapi CMS, collect products into a per-user cart stored in Redis, and
//! check out by leaving a contact email.

pub mod bot;
pub mod cart;
pub mod cms;
pub mod cms_errors;
pub mod config;
pub mod dialogue;
pub mod session;
