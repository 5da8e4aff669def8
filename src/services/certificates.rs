use crate::error::{AppError, Result};
use crate::models::user::FAILED_CERTIFICATE;
use crate::repositories::user::{CertificateInsert, UserStore};

/// The effect a successful grant had on the user's certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    /// The label was newly added.
    Added,
    /// The label was already held; nothing changed.
    AlreadyPresent,
}

impl GrantOutcome {
    /// Whether the grant changed stored state.
    pub fn changed(self) -> bool {
        matches!(self, GrantOutcome::Added)
    }
}

/// Grants certificate `label` to the user with `email`.
///
/// Repeating a grant is harmless: the second call reports
/// `AlreadyPresent` and the label is still held exactly once.
///
/// # Arguments
///
/// * `users` - The user store, which performs the check-and-add atomically.
/// * `email` - The user's email.
/// * `label` - The certificate label.
///
/// # Returns
///
/// A `Result` containing the `GrantOutcome`.
pub async fn grant(users: &dyn UserStore, email: &str, label: &str) -> Result<GrantOutcome> {
    if email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    if label.is_empty() {
        return Err(AppError::Validation("certificate is required".to_string()));
    }

    match users.add_certificate_if_absent(email, label).await? {
        CertificateInsert::Added => {
            tracing::info!("🎓 Certificate {} granted to {}", label, email);
            Ok(GrantOutcome::Added)
        }
        CertificateInsert::AlreadyPresent => {
            tracing::debug!("Certificate {} already held by {}", label, email);
            Ok(GrantOutcome::AlreadyPresent)
        }
        CertificateInsert::NotFound => Err(AppError::NotFound("User not found".to_string())),
    }
}

/// Records a failed attempt for the user with `email`.
///
/// The marker is an ordinary certificate label and does not prevent later
/// grants.
pub async fn mark_failed(users: &dyn UserStore, email: &str) -> Result<GrantOutcome> {
    grant(users, email, FAILED_CERTIFICATE).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Role, User};
    use crate::repositories::memory::MemoryUserStore;

    async fn store_with(email: &str) -> MemoryUserStore {
        let store = MemoryUserStore::new();
        store
            .insert(User::new(
                email.to_string(),
                "A".to_string(),
                Role::Student,
                "hash".to_string(),
                chrono::Utc::now(),
            ))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn grant_is_idempotent() {
        let store = store_with("a@x.com").await;

        let first = grant(&store, "a@x.com", "Cert1").await.unwrap();
        let second = grant(&store, "a@x.com", "Cert1").await.unwrap();
        assert_eq!(first, GrantOutcome::Added);
        assert!(first.changed());
        assert_eq!(second, GrantOutcome::AlreadyPresent);
        assert!(!second.changed());

        let user = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(user.certificates, vec!["Cert1".to_string()]);
    }

    #[tokio::test]
    async fn grant_validates_before_touching_the_store() {
        let store = store_with("a@x.com").await;

        assert!(matches!(
            grant(&store, "", "Cert1").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            grant(&store, "a@x.com", "").await,
            Err(AppError::Validation(_))
        ));

        let user = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert!(user.certificates.is_empty());
    }

    #[tokio::test]
    async fn grant_to_unknown_user_is_not_found() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            grant(&store, "ghost@x.com", "Cert1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_marker_does_not_block_real_certificates() {
        let store = store_with("a@x.com").await;

        assert_eq!(mark_failed(&store, "a@x.com").await.unwrap(), GrantOutcome::Added);
        assert_eq!(
            mark_failed(&store, "a@x.com").await.unwrap(),
            GrantOutcome::AlreadyPresent
        );
        assert_eq!(grant(&store, "a@x.com", "Cert1").await.unwrap(), GrantOutcome::Added);

        let user = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(
            user.certificates,
            vec![FAILED_CERTIFICATE.to_string(), "Cert1".to_string()]
        );
    }
}
