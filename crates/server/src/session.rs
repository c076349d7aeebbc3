// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! This module provides Axum extractors for validating bearer tokens and
//! enforcing authentication at the server boundary.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use clubhub_api::{AuthenticatedActor, AuthenticationService};
use clubhub_domain::User;
use tracing::{debug, warn};

use crate::{AppState, ErrorBody};

/// Extractor for authenticated members.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionUser(actor, user): SessionUser,
/// ) -> Result<Json<Envelope<T>>, HttpError> {
///     // actor: AuthenticatedActor
///     // user: User
/// }
/// ```
///
/// # Authentication Flow
///
/// 1. Extract `Authorization: Bearer <token>` header
/// 2. Validate the token via `AuthenticationService::validate_session`
/// 3. Return the `AuthenticatedActor` and the account it belongs to
///
/// # Errors
///
/// Returns HTTP 401 if the header is missing or malformed, or the session
/// is unknown or expired.
pub struct SessionUser(pub AuthenticatedActor, pub User);

/// Extractor for the raw bearer token, used to end a session.
pub struct BearerToken(pub String);

fn bearer_token(parts: &Parts) -> Result<&str, SessionError> {
    let header = parts
        .headers
        .get("Authorization")
        .ok_or_else(|| {
            debug!("Missing Authorization header");
            SessionError::MissingAuthorizationHeader
        })?
        .to_str()
        .map_err(|_| {
            warn!("Invalid Authorization header encoding");
            SessionError::InvalidAuthorizationHeader
        })?;

    header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header does not start with 'Bearer '");
        SessionError::InvalidAuthorizationHeader
    })
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: &str = bearer_token(parts)?;

        let mut persistence = state.persistence.lock().await;
        let (actor, user) = AuthenticationService::validate_session(&mut persistence, token)
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;

        debug!(
            login_name = %user.login_name,
            role = %actor.role,
            "Session validated successfully"
        );

        Ok(Self(actor, user))
    }
}

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(parts).map(|token| Self(token.to_string()))
    }
}

/// Session extraction errors.
///
/// These are converted to 401 responses in the standard error envelope.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        (StatusCode::UNAUTHORIZED, Json(ErrorBody::new(message))).into_response()
    }
}
