//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ranklens_core::Error;
use serde::Serialize;
use tracing::error;

/// Wrapper that turns engine errors into the API's failure envelope.
///
/// Internal failure classes collapse to a generic 500 so nothing about the
/// storage or provider internals leaks to callers; the real error goes to
/// the log instead.
#[derive(Debug)]
pub struct ApiError(Error);

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct FailureBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self.0 {
            Error::WebsiteNotFound(id) => {
                (StatusCode::NOT_FOUND, "website not found", Some(id))
            }
            Error::WebsiteForbidden(_) => (StatusCode::FORBIDDEN, "website access denied", None),
            Error::InvalidRequest(details) => {
                (StatusCode::BAD_REQUEST, "invalid request", Some(details))
            }
            Error::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, "authentication required", None)
            }
            Error::Provider(err) => {
                error!(error = %err, "provider error escaped the fallback path");
                (StatusCode::BAD_GATEWAY, "upstream provider error", None)
            }
            err => {
                error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error", None)
            }
        };

        let body = FailureBody {
            success: false,
            error: message.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}
