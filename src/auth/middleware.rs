// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Runs once per request, before routing. Allow-listed paths pass through
//! with an anonymous [`AuthContext`]; every other request must carry
//! `Authorization: Bearer <token>` with a token the [`TokenCodec`] accepts,
//! or it is answered with 401 and never reaches routing.
//!
//! ## Pipeline
//!
//! [`secure`] assembles the ordered pipeline:
//!
//! 1. `authenticate` (router layer, before routing)
//! 2. routing
//! 3. `policy::enforce` (route layer, after routing)
//! 4. handler
//!
//! [`TokenCodec`]: super::TokenCodec

use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    Router,
};
use chrono::Utc;
use tracing::debug;

use super::{policy::enforce, AuthContext, AuthError, Principal};
use crate::state::AppState;

/// Paths that skip token verification.
///
/// Entries match exactly, or as a prefix when they end in `*`.
#[derive(Debug, Clone, Default)]
pub struct PublicPaths {
    exact: HashSet<String>,
    prefixes: Vec<String>,
}

impl PublicPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut public = Self::default();
        for path in paths {
            let path = path.as_ref();
            match path.strip_suffix('*') {
                Some(prefix) => public.prefixes.push(prefix.to_string()),
                None => {
                    public.exact.insert(path.to_string());
                }
            }
        }
        public
    }

    pub fn matches(&self, path: &str) -> bool {
        self.exact.contains(path) || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively; the token must be non-empty
/// and contain no whitespace.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Resolve the principal for a request's headers.
fn resolve_principal(state: &AppState, headers: &HeaderMap) -> Result<Principal, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = state.codec.verify(token, Utc::now())?;
    Ok(Principal::from_claims(claims))
}

/// Authentication middleware function.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if state.public_paths.matches(request.uri().path()) {
        request.extensions_mut().insert(AuthContext::anonymous());
        return next.run(request).await;
    }

    let resolved = resolve_principal(&state, request.headers());
    match resolved {
        Ok(principal) => {
            debug!(subject = %principal.subject, "request authenticated");
            request
                .extensions_mut()
                .insert(AuthContext::authenticated(principal));
            next.run(request).await
        }
        Err(e) => {
            debug!(
                error = %e,
                method = %request.method(),
                path = %request.uri().path(),
                "rejected unauthenticated request"
            );
            e.into_response()
        }
    }
}

/// Wrap `routes` in the authentication and authorization pipeline.
///
/// Only routes already added to `routes` are covered; merge everything
/// (including the fallback) before calling this.
pub fn secure(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .route_layer(from_fn_with_state(state.clone(), enforce))
        .layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
}
