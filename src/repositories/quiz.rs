use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::error::StoreError;

/// Read access to quiz content. Documents are returned verbatim.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Lists every quiz document.
    async fn list(&self) -> Result<Vec<sonic_rs::Value>, StoreError>;
}

/// The PostgreSQL-backed `QuizStore`.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: Pool,
}

impl PgQuizStore {
    /// Creates a new store over `pool`.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn list(&self) -> Result<Vec<sonic_rs::Value>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT document::TEXT AS document FROM quizzes ORDER BY created_at",
                &[],
            )
            .await?;

        rows.iter()
            .map(|row| -> Result<sonic_rs::Value, StoreError> {
                let raw: String = row.try_get("document")?;
                sonic_rs::from_str(&raw)
                    .map_err(|e| StoreError::Corrupt(format!("quiz document: {}", e)))
            })
            .collect()
    }
}
