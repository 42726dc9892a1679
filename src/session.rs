//! Redis-backed session store for conversation state and carts.
//!
//! Each chat id owns independent keys, so there is no cross-user locking.
//! Both keys are written with the configured time-to-live; an expired or
//! absent cart key reads back as an empty cart.

use anyhow::Result;
use log::info;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::cart::Cart;
use crate::dialogue::BotState;

/// Session store over a multiplexed async Redis connection
#[derive(Clone)]
pub struct SessionStore {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl SessionStore {
    /// Connect and verify the server with a PING before the dispatcher runs
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Connected to Redis session store");
        Ok(Self { conn, ttl_secs })
    }

    fn state_key(chat_id: i64) -> String {
        format!("state:{chat_id}")
    }

    fn cart_key(chat_id: i64) -> String {
        format!("cart:{chat_id}")
    }

    /// Stored conversation state for a chat, if any
    pub async fn state(&self, chat_id: i64) -> Result<Option<BotState>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(Self::state_key(chat_id)).await?;
        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn set_state(&self, chat_id: i64, state: BotState) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(&state)?;
        let _: () = conn
            .set_ex(Self::state_key(chat_id), json, self.ttl_secs)
            .await?;
        Ok(())
    }

    /// Cart for a chat; missing or expired keys read as an empty cart
    pub async fn cart(&self, chat_id: i64) -> Result<Cart> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(Self::cart_key(chat_id)).await?;
        match value {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Cart::default()),
        }
    }

    /// Write the cart back, refreshing its time-to-live
    pub async fn set_cart(&self, chat_id: i64, cart: &Cart) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(cart)?;
        let _: () = conn
            .set_ex(Self::cart_key(chat_id), json, self.ttl_secs)
            .await?;
        Ok(())
    }

    /// Destroy the cart record, used on checkout
    pub async fn clear_cart(&self, chat_id: i64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::cart_key(chat_id)).await?;
        Ok(())
    }
}
