use crate::api::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::Error;
use tracing::error;

/// Failures that end a request at the HTTP boundary.
///
/// Per-target problems never get here; they travel inside the result body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Domain(#[from] Error),
}

impl ApiError {
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        ApiError::Domain(Error::Unauthorized(detail.into()))
    }

    /// Map a body decoding failure: broken JSON is 400, wrong shape is 422
    pub fn from_json(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => {
                ApiError::Domain(Error::Validation(err.to_string()))
            }
            _ => ApiError::BadRequest(format!("Malformed JSON body: {}", err)),
        }
    }

    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::Domain(Error::Unauthorized(detail)) => {
                (StatusCode::UNAUTHORIZED, detail.clone())
            }
            ApiError::Domain(Error::Validation(detail)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, detail.clone())
            }
            ApiError::Domain(other) => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        (status, Json(ErrorResponse::new(detail))).into_response()
    }
}
