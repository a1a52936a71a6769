// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{secure, PolicyTable, Role},
    error::ApiError,
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod hello;
pub mod users;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const HELLO_USER_PATH: &str = "/api/hello/user";
pub const HELLO_ADMIN_PATH: &str = "/api/hello/admin";
pub const USERS_ME_PATH: &str = "/api/users/me";

/// Required role per protected operation.
pub fn policy_table() -> PolicyTable {
    PolicyTable::new()
        .require(HELLO_USER_PATH, Role::User)
        .require(HELLO_ADMIN_PATH, Role::Admin)
}

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(LOGIN_PATH, post(auth::login))
        .route(HELLO_USER_PATH, get(hello::hello_user))
        .route(HELLO_ADMIN_PATH, get(hello::hello_admin))
        .route(USERS_ME_PATH, get(users::get_current_user))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found);

    secure(routes, state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("no route for {}", uri.path()))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        hello::hello_user,
        hello::hello_admin,
        users::get_current_user,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            Role,
            auth::LoginRequest,
            auth::LoginResponse,
            hello::GreetingResponse,
            users::UserMeResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Token issuance"),
        (name = "Hello", description = "Role-gated greetings"),
        (name = "Users", description = "Current principal"),
        (name = "Health", description = "Liveness and readiness")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
