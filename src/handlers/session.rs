use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::{time::Duration, SameSite};
use tower_cookies::{Cookie, Cookies};

use crate::{
    config::Config,
    error::Result,
    middleware_layer::auth::{extract_session_token, CurrentSession, SESSION_COOKIE},
    models::session::Identity,
    services::{auth as auth_service, session as session_service},
    state::AppState,
    validation::{json::JsonBody, users::require_field},
};

/// The request payload for credential login.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The response payload for session-related requests.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// What a protected route sees of the authenticated session.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedResponse {
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub issued_at: String,
    pub expires_at: String,
}

/// Applies the session cookie attributes for the current environment.
///
/// Production cookies are `Secure` and `SameSite=None` so a separately
/// hosted frontend can send them; elsewhere they are `SameSite=Strict`.
fn apply_session_attributes(cookie: &mut Cookie<'static>, config: &Config) {
    cookie.set_http_only(true);
    cookie.set_path("/");

    if config.production {
        cookie.set_secure(true);
        cookie.set_same_site(SameSite::None);
    } else {
        cookie.set_same_site(SameSite::Strict);
    }
}

/// Creates the session cookie carrying `token`.
pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    apply_session_attributes(&mut cookie, config);
    cookie.set_max_age(Duration::days(config.session_duration_days));
    cookie
}

/// Creates a cookie that makes the client discard the session cookie.
pub fn clearing_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    apply_session_attributes(&mut cookie, config);
    cookie.make_removal();
    cookie
}

fn issue_into_cookie(state: &AppState, cookies: &Cookies, identity: Identity) -> Result<Response> {
    let issued = session_service::login(state, identity)?;

    cookies.add(session_cookie(issued.token, &state.config));

    let response = SessionResponse {
        success: true,
        message: "Session established".to_string(),
        expires_at: Some(issued.claims.expires_at().to_rfc3339()),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Issues a session for the supplied identity claim.
#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(identity): JsonBody<Identity>,
) -> Result<Response> {
    tracing::info!("🔐 Session requested for {}", identity.email);
    issue_into_cookie(&state, &cookies, identity)
}

/// Checks email and password, then issues a session for the stored user.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response> {
    let email = require_field("email", Some(payload.email.as_str()))?;
    let password = require_field("password", Some(payload.password.as_str()))?;

    tracing::info!("🔐 Login attempt for {}", email);

    let user = auth_service::authenticate_user(state.users.as_ref(), email, password).await?;
    issue_into_cookie(&state, &cookies, Identity::from(&user))
}

/// Ends the session, clearing the cookie even if none was sent.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    let presented = extract_session_token(&cookies);
    cookies.add(clearing_cookie(&state.config));

    session_service::logout(&state, presented.as_deref()).await?;

    let response = SessionResponse {
        success: true,
        message: "Logout successful".to_string(),
        expires_at: None,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// A resource only reachable with a valid session.
#[axum::debug_handler]
pub async fn protected_resource(CurrentSession(claims): CurrentSession) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        email: claims.identity.email.clone(),
        name: claims.identity.name.clone(),
        role: claims.identity.role.map(|r| r.to_string()),
        issued_at: claims.issued_at().to_rfc3339(),
        expires_at: claims.expires_at().to_rfc3339(),
    })
}
