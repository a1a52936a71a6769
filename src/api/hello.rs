// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-gated greeting endpoints.
//!
//! Required roles are declared in the router's policy table, not here.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, Principal, Role};

#[derive(Debug, Serialize, ToSchema)]
pub struct GreetingResponse {
    pub message: String,
    /// Authenticated subject
    pub subject: String,
    pub roles: Vec<Role>,
}

impl GreetingResponse {
    fn new(audience: &str, principal: Principal) -> Self {
        Self {
            message: format!("Hello {audience} {}!", principal.subject),
            subject: principal.subject,
            roles: principal.roles.into_iter().collect(),
        }
    }
}

/// Greeting for callers holding `USER`.
#[utoipa::path(
    get,
    path = "/api/hello/user",
    tag = "Hello",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Greeting", body = GreetingResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - USER role required"),
    )
)]
pub async fn hello_user(Auth(principal): Auth) -> Json<GreetingResponse> {
    Json(GreetingResponse::new("user", principal))
}

/// Greeting for callers holding `ADMIN`.
#[utoipa::path(
    get,
    path = "/api/hello/admin",
    tag = "Hello",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Greeting", body = GreetingResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - ADMIN role required"),
    )
)]
pub async fn hello_admin(Auth(principal): Auth) -> Json<GreetingResponse> {
    Json(GreetingResponse::new("admin", principal))
}
