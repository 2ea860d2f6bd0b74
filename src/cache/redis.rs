//! Redis driver using a bb8 connection pool.
//!
//! Entries are stored as JSON envelopes. Fixed expirations use `SET EX`,
//! sliding ones are renewed with `EXPIREAT` on every read.

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Cmd, RedisError};
use serde_json::Value;

use crate::cache::envelope::{Envelope, expires_at};
use crate::cache::options::{CacheOptions, Descriptor};
use crate::cache::traits::{CacheDriver, WriteOutcome};
use crate::cache::validator::ValidatorRunner;
use crate::cache::CacheError;
use crate::config::settings::RedisCacheConfig;

type RedisPool = Pool<Client>;

/// Redis-based driver with bb8 connection pool.
pub struct RedisDriver {
    pool: RedisPool,
    key_prefix: String,
    runner: ValidatorRunner,
}

impl RedisDriver {
    /// Connect and verify the server answers `PING`.
    pub async fn new(
        config: &RedisCacheConfig,
        runner: ValidatorRunner,
    ) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(std::time::Duration::from_secs(config.connection_timeout))
            .build(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let driver = Self {
            pool,
            key_prefix: config.key_prefix.clone(),
            runner,
        };
        driver.ping().await?;

        tracing::debug!(url = %config.url, "Connected to redis");
        Ok(driver)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let _: String = redis::cmd("PING")
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| CacheError::Connection(e.to_string()))?;
        Ok(())
    }

    fn prefixed_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }

    async fn get_conn(&self) -> Result<PooledConnection<'_, Client>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

/// `SET key value`, with `EX ttl` when the entry has a native TTL.
fn set_command(key: &str, bytes: &[u8], ttl: Option<u64>) -> Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(bytes);
    if let Some(ttl) = ttl {
        cmd.arg("EX").arg(ttl);
    }
    cmd
}

/// `EXPIREAT key now+ttl` for sliding entries.
fn renew_command(key: &str, envelope: &Envelope) -> Option<Cmd> {
    envelope.ttl.map(|ttl| {
        let mut cmd = redis::cmd("EXPIREAT");
        cmd.arg(key).arg(expires_at(ttl));
        cmd
    })
}

/// `DEL` replies with the number of removed keys.
fn deleted(count: usize) -> bool {
    count > 0
}

#[async_trait]
impl CacheDriver for RedisDriver {
    async fn write(
        &self,
        key: &str,
        payload: Value,
        descriptor: &Descriptor,
    ) -> Result<WriteOutcome, CacheError> {
        if descriptor.is_expired() {
            self.delete(key).await?;
            return Ok(WriteOutcome::Evicted);
        }

        let bytes = Envelope::new(payload, descriptor).to_bytes()?;
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        set_command(&prefixed, &bytes, descriptor.native_ttl())
            .query_async::<()>(conn_ref)
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))?;

        Ok(WriteOutcome::Stored)
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let bytes: Option<Vec<u8>> = conn_ref
            .get(&prefixed)
            .await
            .map_err(|e: RedisError| CacheError::Operation(e.to_string()))?;
        let Some(bytes) = bytes else {
            return Ok(None);
        };

        let envelope = match Envelope::from_bytes(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(key = %prefixed, error = %e, "Discarding undecodable cache entry");
                conn_ref
                    .del::<_, ()>(&prefixed)
                    .await
                    .map_err(|e| CacheError::Operation(e.to_string()))?;
                return Ok(None);
            }
        };

        if let Some(renew) = renew_command(&prefixed, &envelope) {
            renew
                .query_async::<()>(&mut *conn_ref)
                .await
                .map_err(|e| CacheError::Operation(e.to_string()))?;
        }

        if !self.runner.all_valid(&envelope.validators) {
            tracing::debug!(key = %prefixed, "Evicting entry that failed validation");
            conn_ref
                .del::<_, ()>(&prefixed)
                .await
                .map_err(|e| CacheError::Operation(e.to_string()))?;
            return Ok(None);
        }

        Ok(Some(envelope.payload))
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let prefixed = self.prefixed_key(key);

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let removed: usize = conn_ref
            .del(&prefixed)
            .await
            .map_err(|e: RedisError| CacheError::Operation(e.to_string()))?;
        Ok(deleted(removed))
    }

    async fn clear(&self, options: &CacheOptions) -> Result<bool, CacheError> {
        if !options.all {
            return Ok(false);
        }

        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        tracing::warn!("Flushing every key of the redis server");
        let _: () = redis::cmd("FLUSHALL")
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| CacheError::Operation(e.to_string()))?;
        Ok(true)
    }
}
