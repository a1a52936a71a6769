// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication error type.
///
/// The variants keep the exact failure reason for server-side logging. At
/// the HTTP boundary every unauthorized-class variant collapses into the
/// same 401 body, so callers cannot tell a missing header from a bad
/// signature, an expired token or a wrong password.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("authorization header is required")]
    MissingAuthHeader,
    /// Authorization header is not `Bearer <token>`
    #[error("invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Token could not be decoded
    #[error("token is malformed")]
    MalformedToken,
    /// Token signature does not verify
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Token validity window has elapsed
    #[error("token has expired")]
    TokenExpired,
    /// Token was issued after the verification time
    #[error("token is not yet valid")]
    TokenNotYetValid,
    /// Login not present in the credential directory
    #[error("unknown login")]
    UnknownLogin,
    /// Secret does not match the credential record
    #[error("credential mismatch")]
    CredentialMismatch,
    /// No principal is bound to the request
    #[error("no authenticated principal bound to request")]
    NotAuthenticated,
    /// Principal lacks the role required by the operation
    #[error("insufficient role for this operation")]
    InsufficientRole,
    /// Internal error (e.g. token signing failed)
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    error_code: &'static str,
}

impl AuthError {
    /// Get the error code exposed to callers.
    pub fn error_code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "unauthorized",
            StatusCode::FORBIDDEN => "forbidden",
            _ => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::TokenNotYetValid
            | AuthError::UnknownLogin
            | AuthError::CredentialMismatch
            | AuthError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            _ => "Internal server error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.error_code(),
        });
        (status, body).into_response()
    }
}
