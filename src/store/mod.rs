mod memory;
mod redis_client;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::StoreError;

pub use self::memory::MemoryStore;
pub use self::redis_client::RedisStore;

/// The single capability the reporter needs from a key-value store.
///
/// Each call is awaited before the next one is issued; timeouts and
/// reconnects are the implementation's business.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Store: Send {
    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}
