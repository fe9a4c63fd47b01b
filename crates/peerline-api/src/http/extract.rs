//! Extractors whose rejections use the API error body.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use peerline_types::error::ChatError;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::http::error::AppError;

/// `axum::Json` with malformed bodies reported as `400 INVALID_INPUT`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with bad query strings reported as `400 INVALID_INPUT`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// JSON body that may be left out entirely; an empty body reads as `T::default()`.
///
/// A present body must still be valid JSON, and is not required to carry a
/// `Content-Type` header.
pub struct OptionalJson<T>(pub T);

impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJson(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(OptionalJson)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
    }
}

/// Parse a session id from a path parameter.
///
/// Ids that are not UUIDs cannot name a session, so they are reported the
/// same way as unknown ones.
pub fn parse_session_id(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Chat(ChatError::NotFound))
}
