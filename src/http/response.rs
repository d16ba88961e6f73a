//! API error responses.
//!
//! Every failure ends in a JSON body with an explicit `error` field. Upstream
//! messages are passed through as `message`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::carrier::TrackingError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// `ref` absent or blank.
    MissingRef,
    /// Carrier reports no shipment.
    NotFound(String),
    /// Any other upstream failure.
    TrackingFailed(String),
    /// No route matched.
    UnknownRoute(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingRef => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            ApiError::TrackingFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        match err {
            TrackingError::NotFound(message) => ApiError::NotFound(message),
            other => ApiError::TrackingFailed(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::MissingRef => ErrorBody {
                error: "Missing ref",
                message: None,
            },
            ApiError::NotFound(message) | ApiError::UnknownRoute(message) => ErrorBody {
                error: "Not found",
                message: Some(message),
            },
            ApiError::TrackingFailed(message) => ErrorBody {
                error: "Tracking failed",
                message: Some(message),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
