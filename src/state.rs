use anyhow::Context;
use redis::aio::ConnectionManager;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::crypto::token::TokenCodec;
use crate::repositories::{
    memory::{MemoryQuizStore, MemoryUserStore},
    quiz::{PgQuizStore, QuizStore},
    revocation::{MemoryRevocationList, RedisRevocationList, RevocationList},
    user::{PgUserStore, UserStore},
};

/// The application's state, built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<Config>,
    /// The session token codec.
    pub tokens: Arc<TokenCodec>,
    /// The clock the codec and the denylist read.
    pub clock: Arc<dyn Clock>,
    /// User documents.
    pub users: Arc<dyn UserStore>,
    /// Quiz documents.
    pub quizzes: Arc<dyn QuizStore>,
    /// The revocation denylist, when enabled.
    pub revocations: Option<Arc<dyn RevocationList>>,
}

impl AppState {
    /// Creates a new `AppState` wired to the backends `config` names.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let (users, quizzes): (Arc<dyn UserStore>, Arc<dyn QuizStore>) =
            match &config.database_url {
                Some(url) => {
                    let pool = crate::db::create_pool(url)?;
                    crate::db::ensure_schema(&pool).await?;
                    tracing::info!("✅ PostgreSQL pool initialized");
                    (
                        Arc::new(PgUserStore::new(pool.clone())),
                        Arc::new(PgQuizStore::new(pool)),
                    )
                }
                None => {
                    tracing::warn!("⚠️  DATABASE_URL not set, using the in-memory store");
                    (
                        Arc::new(MemoryUserStore::new()),
                        Arc::new(MemoryQuizStore::default()),
                    )
                }
            };

        let revocations: Option<Arc<dyn RevocationList>> = match (
            config.session_revocation,
            &config.redis_url,
        ) {
            (false, _) => {
                tracing::info!("Session revocation disabled, logout only clears the cookie");
                None
            }
            (true, Some(url)) => {
                let client = redis::Client::open(url.as_str())
                    .context("REDIS_URL is not a valid Redis URL")?;
                let redis = ConnectionManager::new(client)
                    .await
                    .context("Failed to connect to Redis")?;
                tracing::info!("✅ Revocation denylist backed by Redis");
                Some(Arc::new(RedisRevocationList::new(redis)))
            }
            (true, None) => {
                tracing::info!("✅ Revocation denylist kept in memory");
                Some(Arc::new(MemoryRevocationList::new()))
            }
        };

        Ok(Self::from_parts(
            config.clone(),
            Arc::new(SystemClock),
            users,
            quizzes,
            revocations,
        ))
    }

    /// Assembles a state from already-built parts.
    pub fn from_parts(
        config: Config,
        clock: Arc<dyn Clock>,
        users: Arc<dyn UserStore>,
        quizzes: Arc<dyn QuizStore>,
        revocations: Option<Arc<dyn RevocationList>>,
    ) -> Self {
        let tokens = TokenCodec::new(&config.session_secret, clock.clone());

        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            clock,
            users,
            quizzes,
            revocations,
        }
    }
}
