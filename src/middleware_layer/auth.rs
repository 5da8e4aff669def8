use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    crypto::token::TokenError,
    error::{AppError, Result},
    models::session::SessionClaims,
    state::AppState,
};

/// The cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Extracts the session token from the request cookies.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
///
/// # Returns
///
/// An `Option` containing the raw token if a non-empty one is present.
pub fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Verifies `token` and consults the denylist when revocation is enabled.
pub async fn authenticate(state: &AppState, token: &str) -> Result<SessionClaims> {
    let claims = state.tokens.verify(token).map_err(|e| match e {
        TokenError::Expired => AppError::Unauthenticated("token expired".to_string()),
        TokenError::InvalidSignature => {
            AppError::Unauthenticated("invalid token signature".to_string())
        }
        TokenError::Encode(msg) => AppError::Internal(msg),
    })?;

    if let Some(revocations) = &state.revocations {
        if revocations.is_revoked(claims.jti, state.clock.now()).await? {
            return Err(AppError::Unauthenticated(format!(
                "token {} was revoked",
                claims.jti
            )));
        }
    }

    Ok(claims)
}

/// A middleware that requires a valid session token.
///
/// Requests without a `token` cookie are refused without a verification
/// attempt. On success the decoded claims are attached to the request and
/// read back by handlers through [`CurrentSession`].
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or an `AppError::Unauthenticated`.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    tracing::debug!("🔐 Checking authentication...");

    let token = extract_session_token(&cookies)
        .ok_or_else(|| AppError::Unauthenticated("no session cookie".to_string()))?;

    let claims = authenticate(&state, &token).await?;

    tracing::debug!("✅ User authenticated: {}", claims.identity.email);

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// The authenticated session of the current request.
///
/// Only available on routes behind [`require_auth`]; elsewhere extraction
/// fails as unauthenticated.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionClaims);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| AppError::Unauthenticated("no session attached".to_string()))
    }
}
