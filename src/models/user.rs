use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// The certificate label recorded when a user fails a quiz.
pub const FAILED_CERTIFICATE: &str = "Failed";

/// The role a user holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl Role {
    /// The stored tag of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "instructor" => Ok(Role::Instructor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Represents a user in the system.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's email address. Unique and case-sensitive.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The user's role.
    pub role: Role,
    /// The user's argon2 password hash.
    #[serde(skip_serializing)]
    pub password: String,
    /// Earned certificate labels, without duplicates.
    pub certificates: Vec<String>,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh user with no certificates, created at `created_at`.
    pub fn new(
        email: String,
        name: String,
        role: Role,
        password: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            role,
            password,
            certificates: Vec::new(),
            created_at,
        }
    }

    /// Whether the user holds `label`.
    pub fn has_certificate(&self, label: &str) -> bool {
        self.certificates.iter().any(|c| c == label)
    }
}
