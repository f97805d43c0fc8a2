use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use super::{KvBackend, StoreError};

const KEY_NAMESPACE: &str = "cvlm:";

/// Redis backend. Each storage key maps to one string value under the `cvlm:` namespace.
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
}

impl RedisBackend {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis storage backend connected");
        Ok(Self { conn })
    }

    fn namespaced(key: &str) -> String {
        format!("{KEY_NAMESPACE}{key}")
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(Self::namespaced(key)).await?;
        Ok(value)
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(Self::namespaced(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::namespaced(key)).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
