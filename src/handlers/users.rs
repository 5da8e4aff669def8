use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::User,
    services::{
        auth as auth_service,
        certificates::{self as certificate_service, GrantOutcome},
    },
    state::AppState,
    validation::{
        json::JsonBody,
        users::{require_field, validate_sign_up, SignUpRequest},
    },
};

/// The query parameters addressing a user by email.
#[derive(Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: Option<String>,
}

/// The request payload for granting a certificate.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CertificateRequest {
    pub certificate: Option<String>,
}

/// The public part of a newly created user.
#[derive(Serialize)]
pub struct SignUpUser {
    pub name: String,
    pub email: String,
    pub role: String,
    pub certificates: Vec<String>,
}

/// The response payload for a successful sign-up.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub message: String,
    pub user_id: Uuid,
    pub user: SignUpUser,
}

/// The response payload for certificate updates.
#[derive(Serialize)]
pub struct CertificateResponse {
    pub message: String,
    pub certificate: String,
    pub changed: bool,
}

impl CertificateResponse {
    fn new(certificate: &str, outcome: GrantOutcome) -> Self {
        let message = match outcome {
            GrantOutcome::Added => "Certificate added",
            GrantOutcome::AlreadyPresent => "Certificate already present",
        };

        Self {
            message: message.to_string(),
            certificate: certificate.to_string(),
            changed: outcome.changed(),
        }
    }
}

/// Returns the stored document of a user, without the password hash.
#[axum::debug_handler]
pub async fn get_user_data(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<User>> {
    let email = require_field("email", query.email.as_deref())?;

    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Registers a new user.
#[axum::debug_handler]
pub async fn sign_up(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignUpRequest>,
) -> Result<Response> {
    tracing::info!("📝 Sign-up attempt for {}", payload.email);
    let role = validate_sign_up(&payload)?;

    let (user_id, user) = auth_service::sign_up(
        state.users.as_ref(),
        payload.name,
        payload.email,
        &payload.password,
        role,
        state.clock.now(),
    )
    .await?;

    let response = SignUpResponse {
        message: "User signed up successfully!".to_string(),
        user_id,
        user: SignUpUser {
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
            certificates: user.certificates,
        },
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Grants a certificate to a user. Repeating the call changes nothing.
#[axum::debug_handler]
pub async fn add_certificate(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
    JsonBody(payload): JsonBody<CertificateRequest>,
) -> Result<Json<CertificateResponse>> {
    let email = require_field("email", query.email.as_deref())?;
    let certificate = require_field("certificate", payload.certificate.as_deref())?;

    let outcome = certificate_service::grant(state.users.as_ref(), email, certificate).await?;
    Ok(Json(CertificateResponse::new(certificate, outcome)))
}

/// Records a failed attempt for a user.
#[axum::debug_handler]
pub async fn mark_failed(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<CertificateResponse>> {
    let email = require_field("email", query.email.as_deref())?;

    let outcome = certificate_service::mark_failed(state.users.as_ref(), email).await?;
    Ok(Json(CertificateResponse::new(
        crate::models::user::FAILED_CERTIFICATE,
        outcome,
    )))
}
