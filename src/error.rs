use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};
use utoipa::ToSchema;

/// One field-level validation problem, reported back to the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "end_date")]
    pub field: String,
    #[schema(example = "end_date must be on or after start_date")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every failure a handler can produce. Translated to an HTTP response in
/// exactly one place (`error_response`), after logging.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "ValidationError")]
    Validation(Vec<FieldError>),
    #[display(fmt = "{}", _0)]
    InvalidReference(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "Internal Server Error")]
    Store(sqlx::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Store(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(details) => {
                warn!(?details, "Request validation failed");
                HttpResponse::BadRequest().json(json!({
                    "error": "ValidationError",
                    "details": details
                }))
            }
            ApiError::InvalidReference(msg) => {
                warn!(%msg, "Rejected invalid reference");
                HttpResponse::BadRequest().json(json!({ "error": msg }))
            }
            ApiError::NotFound(msg) => {
                warn!(%msg, "Target row not found");
                HttpResponse::NotFound().json(json!({ "error": msg }))
            }
            ApiError::Store(e) => {
                error!(error = %e, "Database operation failed");
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal Server Error"
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn response_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn validation_maps_to_400_with_details() {
        let err = ApiError::Validation(vec![FieldError::new("user_id", "user_id is required")]);
        let (status, body) = response_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(body["details"][0]["field"], "user_id");
        assert_eq!(body["details"][0]["message"], "user_id is required");
    }

    #[actix_web::test]
    async fn invalid_reference_maps_to_400() {
        let err = ApiError::InvalidReference("Invalid requester user_id".into());
        let (status, body) = response_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid requester user_id");
        assert!(body.get("details").is_none());
    }

    #[actix_web::test]
    async fn not_found_maps_to_404() {
        let err = ApiError::NotFound("Request not found".into());
        let (status, body) = response_json(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Request not found");
    }

    #[actix_web::test]
    async fn store_failure_maps_to_500_without_leaking() {
        let err = ApiError::Store(sqlx::Error::PoolTimedOut);
        let (status, body) = response_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
        assert!(!body.to_string().contains("pool"));
    }
}
