// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{auth::IssuedToken, error::ApiError, state::AppState};

/// Login credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login identifier (case-sensitive)
    pub login: String,
    /// Secret
    pub password: String,
}

/// Issued access token.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Signed bearer token
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Expiration (Unix seconds)
    pub expires_at: i64,
    /// Seconds until expiration
    pub expires_in: i64,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            expires_in: issued.expires_in(),
            expires_at: issued.expires_at,
            access_token: issued.token,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Exchange login credentials for an access token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Malformed request body"),
        (status = 415, description = "Body is not `application/json`"),
        (status = 422, description = "Missing or mistyped fields"),
        (status = 401, description = "Unauthorized - unknown login or wrong secret"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;

    let record = state
        .directory
        .authenticate(&request.login, &request.password)
        .inspect_err(|e| warn!(login = %request.login, reason = %e, "login rejected"))?;

    let issued = state.codec.issue_for(record, Utc::now())?;
    info!(
        subject = %record.login,
        expires_at = issued.expires_at,
        "issued access token"
    );

    Ok(Json(issued.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_from_issued_token() {
        let response: LoginResponse = IssuedToken {
            token: "a.b.c".to_string(),
            issued_at: 100,
            expires_at: 1_000,
        }
        .into();

        assert_eq!(response.access_token, "a.b.c");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_at, 1_000);
        assert_eq!(response.expires_in, 900);
    }
}
