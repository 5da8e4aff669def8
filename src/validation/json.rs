use axum::extract::FromRequest;

use crate::error::AppError;

/// A JSON request body whose rejections surface as `AppError::Validation`.
///
/// A missing body, a wrong content type, malformed JSON and mistyped fields
/// all answer 400 with the usual `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::IntoResponse;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Payload {
        certificate: Option<String>,
    }

    async fn extract(request: Request<Body>) -> Result<JsonBody<Payload>, AppError> {
        JsonBody::<Payload>::from_request(request, &()).await
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request<Body> {
        let mut builder = Request::builder().method("PATCH").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        let JsonBody(payload) = extract(request(Some("application/json"), r#"{"certificate":"C"}"#))
            .await
            .unwrap();
        assert_eq!(payload.certificate.as_deref(), Some("C"));
    }

    #[tokio::test]
    async fn bad_bodies_are_validation_errors() {
        let cases = [
            request(None, ""),
            request(Some("text/plain"), r#"{"certificate":"C"}"#),
            request(Some("application/json"), "{not json"),
            request(Some("application/json"), r#"{"certificate":5}"#),
        ];

        for case in cases {
            let err = extract(case).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }
}
