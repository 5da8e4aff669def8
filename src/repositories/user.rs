use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::{error::SqlState, Row};
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::user::{Role, User},
};

/// Outcome of an atomic add-if-absent on a user's certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateInsert {
    /// The label was not present and has been added.
    Added,
    /// The label was already present; nothing changed.
    AlreadyPresent,
    /// No user has the given email.
    NotFound,
}

/// Persistence for user documents, keyed by unique email.
///
/// Implementations own the atomicity of `add_certificate_if_absent` and the
/// uniqueness of emails; callers hold no locks.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a new user, failing with `StoreError::DuplicateKey` when the
    /// email is taken.
    async fn insert(&self, user: User) -> Result<Uuid, StoreError>;

    /// Adds `label` to the user's certificates unless it is already there.
    async fn add_certificate_if_absent(
        &self,
        email: &str,
        label: &str,
    ) -> Result<CertificateInsert, StoreError>;
}

/// The PostgreSQL-backed `UserStore`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    /// Creates a new store over `pool`.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User, StoreError> {
    let role: String = row.try_get("role")?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: role.parse::<Role>().map_err(StoreError::Corrupt)?,
        password: row.try_get("password")?,
        certificates: row.try_get("certificates")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, email, name, role, password, certificates, created_at
                FROM users
                WHERE email = $1
                "#,
                &[&email],
            )
            .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn insert(&self, user: User) -> Result<Uuid, StoreError> {
        let client = self.pool.get().await?;
        let result = client
            .query_one(
                r#"
                INSERT INTO users (id, email, name, role, password, certificates, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
                &[
                    &user.id,
                    &user.email,
                    &user.name,
                    &user.role.as_str(),
                    &user.password,
                    &user.certificates,
                    &user.created_at,
                ],
            )
            .await;

        match result {
            Ok(row) => Ok(row.try_get("id")?),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(StoreError::DuplicateKey(user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn add_certificate_if_absent(
        &self,
        email: &str,
        label: &str,
    ) -> Result<CertificateInsert, StoreError> {
        let client = self.pool.get().await?;

        // A concurrent update of the same row re-evaluates the WHERE clause
        // after the first commits, so a label can only be appended once.
        let updated = client
            .query_opt(
                r#"
                UPDATE users
                SET certificates = array_append(certificates, $2::TEXT)
                WHERE email = $1 AND NOT ($2::TEXT = ANY(certificates))
                RETURNING id
                "#,
                &[&email, &label],
            )
            .await?;

        if updated.is_some() {
            return Ok(CertificateInsert::Added);
        }

        let exists = client
            .query_opt("SELECT 1 FROM users WHERE email = $1", &[&email])
            .await?;

        Ok(match exists {
            Some(_) => CertificateInsert::AlreadyPresent,
            None => CertificateInsert::NotFound,
        })
    }
}
