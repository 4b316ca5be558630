use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use super::Store;
use crate::error::StoreError;

/// Redis-backed store writing plain `SET key value` commands.
///
/// `ConnectionManager` reconnects on its own after a dropped connection;
/// writes issued while it is down fail with [`StoreError::Unavailable`].
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Opens the connection. The client usually comes from
    /// [`StoreTarget::client`](crate::config::StoreTarget::client).
    pub async fn connect(client: redis::Client) -> Result<Self, StoreError> {
        let addr = client.get_connection_info().addr.to_string();
        let conn = ConnectionManager::new(client).await?;
        info!(%addr, "connected to redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let _: () = self.conn.set(key, value).await?;
        Ok(())
    }
}
