use crate::crypto::token::IssuedToken;
use crate::error::{AppError, Result};
use crate::models::session::Identity;
use crate::state::AppState;

/// Issues a session token for `identity`, valid for the configured TTL.
///
/// Called once some credential check has succeeded; nothing is stored
/// server-side.
pub fn login(state: &AppState, identity: Identity) -> Result<IssuedToken> {
    if identity.email.trim().is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }

    let issued = state
        .tokens
        .issue(identity, state.config.session_ttl())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(
        "🔑 Session issued for {} (jti {}, expires {})",
        issued.claims.identity.email,
        issued.claims.jti,
        issued.claims.expires_at().to_rfc3339()
    );

    Ok(issued)
}

/// Ends the session the client presented, if any.
///
/// Always succeeds for missing or invalid tokens. With revocation enabled a
/// still-valid token is denylisted until its natural expiry; otherwise the
/// token stays valid until then and only the client-side cookie goes away.
/// A failing denylist is logged and does not fail the logout.
pub async fn logout(state: &AppState, presented: Option<&str>) -> Result<()> {
    let (Some(revocations), Some(token)) = (&state.revocations, presented) else {
        return Ok(());
    };

    let Ok(claims) = state.tokens.verify(token) else {
        tracing::debug!("Logout with an unusable token, nothing to revoke");
        return Ok(());
    };

    // The client still drops its cookie; a denylist outage must not block logout.
    if let Err(e) = revocations
        .revoke(claims.jti, claims.expires_at(), state.clock.now())
        .await
    {
        tracing::error!("Failed to revoke session {}: {}", claims.jti, e);
        return Ok(());
    }

    tracing::info!(
        "👋 Session {} for {} revoked",
        claims.jti,
        claims.identity.email
    );
    Ok(())
}
