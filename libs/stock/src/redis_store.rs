use std::time::Duration;

use anyhow::{Error, Result};
use async_trait::async_trait;
use fred::prelude::*;
use tracing::error;

use crate::KeyValueStore;

/// Redis-backed [`KeyValueStore`].
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    key_prefix: Option<String>,
}

impl RedisStore {
    pub async fn new(redis_url: &str, key_prefix: Option<String>) -> Result<Self, Error> {
        let config = Config::from_url(redis_url)?;

        let client = Builder::from_config(config)
            .with_connection_config(|config| {
                config.connection_timeout = Duration::from_secs(5);
                config.tcp = TcpConfig {
                    nodelay: Some(true),
                    ..Default::default()
                };
            })
            .build()?;

        client.on_error(|(error, server)| async move {
            error!("{:?}: Redis connection error: {:?}", server, error);
            Ok(())
        });

        client.connect();
        client.wait_for_connect().await?;

        Ok(Self {
            client,
            key_prefix: key_prefix.filter(|p| !p.is_empty()),
        })
    }

    fn key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{prefix}:{key}"),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_add(&self, key: &str, members: &[String]) -> Result<()> {
        let _: i64 = self.client.sadd(self.key(key), members.to_vec()).await?;
        Ok(())
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> Result<()> {
        let _: i64 = self.client.srem(self.key(key), members.to_vec()).await?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.client
            .smembers(self.key(key))
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _: i64 = self.client.del(self.key(key)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.client.get(self.key(key)).await.map_err(Error::from)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _: () = self
            .client
            .set(self.key(key), value, None, None, false)
            .await?;
        Ok(())
    }
}
