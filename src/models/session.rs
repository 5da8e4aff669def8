use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User};

/// The identity payload a session token is issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The email of the authenticated user.
    pub email: String,
    /// The display name, if supplied at issuance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The role, if supplied at issuance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: Some(user.name.clone()),
            role: Some(user.role),
        }
    }
}

/// The claims carried inside a signed session token.
///
/// Tokens are never edited: a refreshed session is a newly issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The identity the token was issued for.
    #[serde(flatten)]
    pub identity: Identity,
    /// Issued-at, in seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, in seconds since the Unix epoch.
    pub exp: i64,
    /// Unique token identifier, used by the revocation denylist.
    pub jti: Uuid,
}

impl SessionClaims {
    /// When the token was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        to_datetime(self.iat)
    }

    /// When the token stops being valid.
    pub fn expires_at(&self) -> DateTime<Utc> {
        to_datetime(self.exp)
    }
}

fn to_datetime(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
