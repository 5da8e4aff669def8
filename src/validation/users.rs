use garde::Validate;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::user::Role,
};

/// The request payload for signing up.
#[derive(Deserialize, Validate, Default)]
#[serde(default)]
pub struct SignUpRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
    #[garde(skip)]
    pub role: Option<String>,
}

/// Validates a sign-up payload and resolves its role.
///
/// A missing role means `student`.
pub fn validate_sign_up(request: &SignUpRequest) -> Result<Role> {
    request
        .validate()
        .map_err(|report| AppError::Validation(report.to_string()))?;

    match request.role.as_deref().map(str::trim) {
        None | Some("") => Ok(Role::default()),
        Some(role) => role.parse().map_err(AppError::Validation),
    }
}

/// Returns `value` if it is present and not blank.
pub fn require_field<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SignUpRequest {
        SignUpRequest {
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: "p".to_string(),
            role: Some("student".to_string()),
        }
    }

    #[test]
    fn accepts_a_complete_request() {
        assert_eq!(validate_sign_up(&request()).unwrap(), Role::Student);
    }

    #[test]
    fn defaults_missing_role_to_student() {
        let mut req = request();
        req.role = None;
        assert_eq!(validate_sign_up(&req).unwrap(), Role::Student);
    }

    #[test]
    fn rejects_bad_fields() {
        let mut req = request();
        req.email = "not-an-email".to_string();
        assert!(matches!(validate_sign_up(&req), Err(AppError::Validation(_))));

        let mut req = request();
        req.name.clear();
        assert!(matches!(validate_sign_up(&req), Err(AppError::Validation(_))));

        let mut req = request();
        req.password.clear();
        assert!(matches!(validate_sign_up(&req), Err(AppError::Validation(_))));

        let mut req = request();
        req.role = Some("wizard".to_string());
        assert!(matches!(validate_sign_up(&req), Err(AppError::Validation(_))));
    }

    #[test]
    fn require_field_rejects_missing_and_blank() {
        assert_eq!(require_field("email", Some("a@x.com")).unwrap(), "a@x.com");
        assert!(require_field("email", None).is_err());
        assert!(require_field("email", Some("  ")).is_err());
    }
}
