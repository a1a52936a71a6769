// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped auth context and Axum extractors.
//!
//! The authentication middleware inserts exactly one [`AuthContext`] into
//! each request's extensions. Handlers read it either as `Auth(principal)`,
//! which rejects anonymous requests, or as the [`AuthContext`] itself and
//! call [`AuthContext::current`]:
//!
//! ```rust,ignore
//! async fn my_handler(context: AuthContext) -> Result<impl IntoResponse, AuthError> {
//!     let principal = context.current()?;
//!     // principal is the verified Principal for this request only
//! }
//! ```
//!
//! The context travels with the request value itself, so concurrent
//! requests never observe each other's principal.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Principal};

/// Per-request authentication slot.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    principal: Option<Principal>,
}

impl AuthContext {
    /// Context for an allow-listed request.
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    /// The bound principal, or `NotAuthenticated`.
    pub fn current(&self) -> Result<&Principal, AuthError> {
        self.principal.as_ref().ok_or(AuthError::NotAuthenticated)
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Extractor for the authenticated principal.
///
/// Rejects with 401 when the request carries no principal.
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .ok_or(AuthError::NotAuthenticated)?
            .current()
            .cloned()
            .map(Auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn current_signals_missing_principal() {
        assert!(matches!(
            AuthContext::anonymous().current(),
            Err(AuthError::NotAuthenticated)
        ));

        let context = AuthContext::authenticated(Principal::new("peter", [Role::User]));
        assert!(context.principal().is_some());
        assert_eq!(context.current().unwrap().subject, "peter");
    }

    #[tokio::test]
    async fn auth_extractor_requires_context() {
        let mut parts = parts();
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_anonymous_context() {
        let mut parts = parts();
        parts.extensions.insert(AuthContext::anonymous());

        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn auth_extractor_reads_bound_principal() {
        let mut parts = parts();
        parts
            .extensions
            .insert(AuthContext::authenticated(Principal::new("ivan", [Role::Admin])));

        let Auth(principal) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(principal.subject, "ivan");
        assert!(principal.has_role(Role::Admin));
    }

    #[tokio::test]
    async fn context_extractor_defaults_to_anonymous() {
        let mut parts = parts();
        let context = AuthContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(context.principal().is_none());
        assert!(matches!(context.current(), Err(AuthError::NotAuthenticated)));
    }
}
