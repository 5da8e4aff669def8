use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::user::User,
    repositories::{
        quiz::QuizStore,
        user::{CertificateInsert, UserStore},
    },
};

/// An in-process `UserStore`, used when no database is configured and in tests.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert(&self, user: User) -> Result<Uuid, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::DuplicateKey(user.email));
        }

        let id = user.id;
        users.insert(user.email.clone(), user);
        Ok(id)
    }

    async fn add_certificate_if_absent(
        &self,
        email: &str,
        label: &str,
    ) -> Result<CertificateInsert, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(email) else {
            return Ok(CertificateInsert::NotFound);
        };

        if user.has_certificate(label) {
            return Ok(CertificateInsert::AlreadyPresent);
        }

        user.certificates.push(label.to_string());
        Ok(CertificateInsert::Added)
    }
}

/// An in-process `QuizStore` holding opaque quiz documents.
#[derive(Clone, Default)]
pub struct MemoryQuizStore {
    quizzes: Arc<RwLock<Vec<sonic_rs::Value>>>,
}

impl MemoryQuizStore {
    /// Creates a store seeded with `quizzes`.
    pub fn with_quizzes(quizzes: Vec<sonic_rs::Value>) -> Self {
        Self {
            quizzes: Arc::new(RwLock::new(quizzes)),
        }
    }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn list(&self) -> Result<Vec<sonic_rs::Value>, StoreError> {
        Ok(self.quizzes.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn user(email: &str) -> User {
        User::new(
            email.to_string(),
            "A".to_string(),
            Role::Student,
            "hash".to_string(),
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email_without_touching_original() {
        let store = MemoryUserStore::new();
        let original = user("a@x.com");
        let original_id = store.insert(original.clone()).await.unwrap();

        let mut second = user("a@x.com");
        second.name = "Impostor".to_string();
        let err = store.insert(second).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref e) if e == "a@x.com"));

        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, original_id);
        assert_eq!(stored.name, "A");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn emails_are_case_sensitive() {
        let store = MemoryUserStore::new();
        store.insert(user("a@x.com")).await.unwrap();
        store.insert(user("A@x.com")).await.unwrap();
        assert!(store.find_by_email("A@X.COM").await.unwrap().is_none());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn add_certificate_if_absent_reports_each_outcome() {
        let store = MemoryUserStore::new();
        store.insert(user("a@x.com")).await.unwrap();

        assert_eq!(
            store.add_certificate_if_absent("a@x.com", "Cert1").await.unwrap(),
            CertificateInsert::Added
        );
        assert_eq!(
            store.add_certificate_if_absent("a@x.com", "Cert1").await.unwrap(),
            CertificateInsert::AlreadyPresent
        );
        assert_eq!(
            store.add_certificate_if_absent("b@x.com", "Cert1").await.unwrap(),
            CertificateInsert::NotFound
        );
    }

    #[tokio::test]
    async fn concurrent_adds_never_duplicate() {
        let store = MemoryUserStore::new();
        store.insert(user("a@x.com")).await.unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.add_certificate_if_absent("a@x.com", "Cert1").await
                })
            })
            .collect();

        let mut added = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == CertificateInsert::Added {
                added += 1;
            }
        }

        assert_eq!(added, 1);
        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.certificates, vec!["Cert1".to_string()]);
    }
}
