use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use fishshop_bot::bot::{self, App};
use fishshop_bot::cms::CmsClient;
use fishshop_bot::config::AppConfig;
use fishshop_bot::session::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    info!("Starting Fish Shop Telegram Bot");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Missing required configuration aborts before the event loop
    let config = AppConfig::from_env()?;

    let cms = CmsClient::new(&config.starapi_url, &config.starapi_token)?;

    info!(
        "Connecting to Redis at {}:{}",
        config.redis_host, config.redis_port
    );
    let sessions = SessionStore::connect(&config.redis_url(), config.cart_ttl_secs).await?;

    let bot = Bot::new(&config.bot_token);
    let app = Arc::new(App { cms, sessions });

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(bot::message_handler))
        .branch(Update::filter_callback_query().endpoint(bot::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![app])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
