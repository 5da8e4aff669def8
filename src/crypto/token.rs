use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::session::{Identity, SessionClaims};

/// Why a token was refused or could not be produced.
///
/// `InvalidSignature` and `Expired` are only told apart in logs; callers
/// report both as unauthenticated.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The token is malformed or its signature does not match.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token's expiry is not after the current time.
    #[error("token expired")]
    Expired,

    /// The token could not be encoded.
    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// A freshly issued token together with its claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The compact, signed token to hand to the client.
    pub token: String,
    /// The claims encoded in `token`.
    pub claims: SessionClaims,
}

/// Signs and verifies session tokens with a process-wide HMAC key.
///
/// The key is read-only after construction, so a codec can be shared across
/// request tasks without synchronization.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Creates a codec signing with `secret` and reading time from `clock`.
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against `clock`, not the system time.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        }
    }

    /// Issues a token for `identity` that expires `ttl` from now.
    pub fn issue(
        &self,
        identity: Identity,
        ttl: chrono::Duration,
    ) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.now();
        let claims = SessionClaims {
            identity,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| TokenError::Encode(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verifies the signature and expiry of `token`, returning its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims = jsonwebtoken::decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| {
            tracing::debug!("Token rejected: {:?}", e.kind());
            TokenError::InvalidSignature
        })?
        .claims;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
