// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AuthContext, AuthError, Principal, Role};

/// Response for GET /api/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// Subject (login) from the verified token
    pub subject: String,
    /// Granted roles
    pub roles: Vec<Role>,
    /// Display name (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<Principal> for UserMeResponse {
    fn from(principal: Principal) -> Self {
        Self {
            subject: principal.subject,
            roles: principal.roles.into_iter().collect(),
            display_name: principal.display_name,
        }
    }
}

/// Get the current authenticated principal.
///
/// This endpoint returns the identity and roles carried by the caller's token.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Principal information", body = UserMeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(context: AuthContext) -> Result<Json<UserMeResponse>, AuthError> {
    let principal = context.current()?;
    Ok(Json(principal.clone().into()))
}
