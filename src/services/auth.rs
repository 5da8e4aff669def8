use crate::error::{AppError, Result};
use crate::models::user::{Role, User};
use crate::repositories::user::UserStore;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use zeroize::Zeroize;

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the PHC-encoded hash.
pub fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)));

    password_bytes.zeroize();
    Ok(password_hash?.to_string())
}

/// Verifies a password against a hash.
///
/// # Arguments
///
/// * `password` - The password to verify.
/// * `hash` - The hash to verify against.
///
/// # Returns
///
/// A `Result` containing `true` if the password is valid, `false` otherwise.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    Ok(result)
}

/// Creates a new user with an empty certificate set.
///
/// The lookup before the insert only produces a friendlier conflict; the
/// store's uniqueness constraint is what actually decides.
///
/// # Returns
///
/// A `Result` containing the ID and the stored `User`.
pub async fn sign_up(
    users: &dyn UserStore,
    name: String,
    email: String,
    password: &str,
    role: Role,
    now: DateTime<Utc>,
) -> Result<(Uuid, User)> {
    tracing::debug!("📝 Creating user: {}", email);

    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "User with this email already exists.".to_string(),
        ));
    }

    let user = User::new(email, name, role, hash_password(password)?, now);
    let user_id = users.insert(user.clone()).await?;

    tracing::info!("✅ User created with ID: {}", user_id);
    Ok((user_id, user))
}

/// Checks an email/password pair against the stored user.
///
/// Unknown emails and wrong passwords fail identically.
pub async fn authenticate_user(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User> {
    tracing::debug!("🔐 Authenticating user: {}", email);

    let invalid = || AppError::Unauthenticated("invalid email or password".to_string());

    let user = users.find_by_email(email).await?.ok_or_else(invalid)?;

    if !verify_password(password, &user.password)? {
        return Err(invalid());
    }

    tracing::info!("✅ User authenticated: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryUserStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn password_hash_and_verify() {
        let hash = hash_password("correct-password").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct-password", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[tokio::test]
    async fn sign_up_stores_hashed_password_and_no_certificates() {
        let store = MemoryUserStore::new();
        let (id, user) = sign_up(&store, "A".into(), "a@x.com".into(), "p", Role::Student, now())
            .await
            .unwrap();

        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.id, user.id);
        assert!(stored.certificates.is_empty());
        assert_ne!(stored.password, "p");
        assert_eq!(stored.created_at, now());
    }

    #[tokio::test]
    async fn second_sign_up_conflicts_and_leaves_original() {
        let store = MemoryUserStore::new();
        sign_up(&store, "A".into(), "a@x.com".into(), "p", Role::Student, now())
            .await
            .unwrap();

        let err = sign_up(&store, "B".into(), "a@x.com".into(), "q", Role::Admin, now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.name, "A");
        assert_eq!(stored.role, Role::Student);
        assert!(verify_password("p", &stored.password).unwrap());
    }

    #[tokio::test]
    async fn authenticate_rejects_unknown_email_and_wrong_password() {
        let store = MemoryUserStore::new();
        sign_up(&store, "A".into(), "a@x.com".into(), "p", Role::Student, now())
            .await
            .unwrap();

        assert!(authenticate_user(&store, "a@x.com", "p").await.is_ok());
        assert!(matches!(
            authenticate_user(&store, "a@x.com", "nope").await,
            Err(AppError::Unauthenticated(_))
        ));
        assert!(matches!(
            authenticate_user(&store, "b@x.com", "p").await,
            Err(AppError::Unauthenticated(_))
        ));
    }
}
