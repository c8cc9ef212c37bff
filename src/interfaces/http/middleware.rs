//! Caller identity middleware
//!
//! The upstream authentication gateway verifies credentials and forwards the
//! caller as `X-User-Id` / `X-User-Role`. This layer only parses those
//! headers into a [`Caller`] request extension; it performs no verification.

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::common::ApiResponse;
use crate::domain::{Caller, UserRole};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Identity errors
#[derive(Debug, PartialEq, Eq)]
pub enum IdentityError {
    MissingUserId,
    InvalidUserId,
    InvalidRole,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingUserId => "Missing caller identity",
            Self::InvalidUserId => "Caller id must be a UUID",
            Self::InvalidRole => "Unknown caller role",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(message)),
        )
            .into_response()
    }
}

/// Read the caller from trusted gateway headers. A missing role means `user`.
pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, IdentityError> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(IdentityError::MissingUserId)?;
    let user_id = Uuid::parse_str(user_id).map_err(|_| IdentityError::InvalidUserId)?;

    let role = match headers.get(USER_ROLE_HEADER) {
        None => UserRole::User,
        Some(value) => value
            .to_str()
            .ok()
            .and_then(UserRole::parse)
            .ok_or(IdentityError::InvalidRole)?,
    };

    Ok(Caller::new(user_id, role))
}

pub async fn identity_middleware(mut request: Request<Body>, next: Next) -> Response {
    match caller_from_headers(request.headers()) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
