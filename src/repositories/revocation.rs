use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, AsyncCommands};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;

/// A denylist of token identifiers revoked before their natural expiry.
#[async_trait]
pub trait RevocationList: Send + Sync {
    /// Revokes `jti` until `expires_at`, after which the token is dead anyway.
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()>;

    /// Whether `jti` has been revoked.
    async fn is_revoked(&self, jti: Uuid, now: DateTime<Utc>) -> Result<bool>;
}

/// Redis-backed denylist. Entries carry a TTL so Redis evicts them on expiry.
#[derive(Clone)]
pub struct RedisRevocationList {
    redis: ConnectionManager,
}

impl RedisRevocationList {
    /// Creates a new denylist over `redis`.
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

fn revocation_key(jti: Uuid) -> String {
    format!("revoked:{}", jti)
}

#[async_trait]
impl RevocationList for RedisRevocationList {
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        let remaining = (expires_at - now).num_seconds();
        if remaining <= 0 {
            return Ok(());
        }

        let mut redis = self.redis.clone();
        let _: () = redis
            .set_ex(revocation_key(jti), 1u8, remaining as u64)
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid, _now: DateTime<Utc>) -> Result<bool> {
        let mut redis = self.redis.clone();
        let revoked: bool = redis.exists(revocation_key(jti)).await?;
        Ok(revoked)
    }
}

/// In-process denylist, used when no Redis is configured.
#[derive(Clone, Default)]
pub struct MemoryRevocationList {
    revoked: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
}

impl MemoryRevocationList {
    /// Creates a new, empty denylist.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationList for MemoryRevocationList {
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, until| *until > now);
        if expires_at > now {
            revoked.insert(jti, expires_at);
        }
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let revoked = self.revoked.read().await;
        Ok(revoked.get(&jti).is_some_and(|until| *until > now))
    }
}
