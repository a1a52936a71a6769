// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;

/// Handler error.
///
/// Authentication failures keep the uniform auth response; everything else
/// renders as `{"error": "<message>"}`. Body rejections keep the status axum
/// chose for them (400, 415, 422, ...).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Auth(e) => e.status_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(e) => e.into_response(),
            other => {
                let status = other.status();
                let body = Json(ErrorBody {
                    error: other.to_string(),
                });
                (status, body).into_response()
            }
        }
    }
}
