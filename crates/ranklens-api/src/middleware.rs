//! HTTP middleware for the API server.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{HeaderName, Method, Request, header, request::Parts},
    middleware::Next,
    response::Response,
};
use ranklens_core::{Error, UserId};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated user, installed by the upstream
/// gateway before requests reach this service.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Create CORS middleware layer.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .allow_origin(Any)
}

/// Inject request ID into each request.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    request
        .headers_mut()
        .insert("x-request-id", request_id.parse().unwrap());

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert("x-request-id", request_id.parse().unwrap());

    response
}

/// The calling user, taken from [`USER_ID_HEADER`].
///
/// Requests without the header (or with one that does not parse) are
/// rejected with 401 before any handler logic runs.
pub struct Identity(pub UserId);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::AuthenticationRequired)?;

        let user_id = raw
            .parse::<UserId>()
            .map_err(|_| Error::AuthenticationRequired)?;

        Ok(Identity(user_id))
    }
}
