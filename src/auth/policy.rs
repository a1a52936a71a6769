// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-based authorization.
//!
//! Each protected operation declares one required role in a [`PolicyTable`].
//! The [`enforce`] route layer looks the matched route up and checks the
//! principal bound by the authentication middleware.

use std::collections::HashMap;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{AuthContext, AuthError, Principal, Role};
use crate::state::AppState;

/// Authorization verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Decide whether `principal` may perform an operation requiring `required`.
pub fn authorize(required: Role, principal: Option<&Principal>) -> Decision {
    match principal {
        Some(principal) if principal.has_role(required) => Decision::Allow,
        _ => Decision::Deny,
    }
}

/// Route path -> required role.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    rules: HashMap<String, Role>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `path` requires `role`. A later declaration for the same
    /// path replaces the earlier one.
    pub fn require(mut self, path: impl Into<String>, role: Role) -> Self {
        self.rules.insert(path.into(), role);
        self
    }

    pub fn required_role(&self, path: &str) -> Option<Role> {
        self.rules.get(path).copied()
    }

    /// Check the bound context against the rule for `path`.
    ///
    /// Paths without a rule only need the authentication middleware to
    /// have let the request through.
    pub fn check(&self, path: &str, context: Option<&AuthContext>) -> Result<(), AuthError> {
        let Some(required) = self.required_role(path) else {
            return Ok(());
        };

        let principal = context.and_then(AuthContext::principal);
        match (authorize(required, principal), principal) {
            (Decision::Allow, _) => Ok(()),
            (Decision::Deny, None) => Err(AuthError::NotAuthenticated),
            (Decision::Deny, Some(_)) => Err(AuthError::InsufficientRole),
        }
    }
}

/// Authorization middleware. Install with `Router::route_layer`.
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let verdict = state
        .policy
        .check(&path, request.extensions().get::<AuthContext>());
    match verdict {
        Ok(()) => next.run(request).await,
        Err(e) => {
            debug!(error = %e, path = %path, "authorization denied");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PolicyTable {
        PolicyTable::new()
            .require("/api/hello/user", Role::User)
            .require("/api/hello/admin", Role::Admin)
    }

    #[test]
    fn authorize_requires_exact_role() {
        let peter = Principal::new("peter", [Role::User]);
        let ivan = Principal::new("ivan", [Role::Admin]);

        assert_eq!(authorize(Role::User, Some(&peter)), Decision::Allow);
        assert_eq!(authorize(Role::Admin, Some(&peter)), Decision::Deny);
        assert_eq!(authorize(Role::Admin, Some(&ivan)), Decision::Allow);
        // no hierarchy
        assert_eq!(authorize(Role::User, Some(&ivan)), Decision::Deny);
    }

    #[test]
    fn authorize_denies_without_principal() {
        assert_eq!(authorize(Role::User, None), Decision::Deny);
    }

    #[test]
    fn check_maps_denials() {
        let table = table();
        let peter = AuthContext::authenticated(Principal::new("peter", [Role::User]));
        let anonymous = AuthContext::anonymous();

        assert!(table.check("/api/hello/user", Some(&peter)).is_ok());
        assert!(matches!(
            table.check("/api/hello/admin", Some(&peter)),
            Err(AuthError::InsufficientRole)
        ));
        assert!(matches!(
            table.check("/api/hello/user", Some(&anonymous)),
            Err(AuthError::NotAuthenticated)
        ));
        assert!(matches!(
            table.check("/api/hello/user", None),
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[test]
    fn unlisted_paths_are_not_role_gated() {
        let table = table();
        assert_eq!(table.required_role("/api/users/me"), None);
        assert!(table.check("/api/users/me", None).is_ok());
    }

    #[test]
    fn later_declaration_wins() {
        let table = table().require("/api/hello/user", Role::Admin);
        assert_eq!(table.required_role("/api/hello/user"), Some(Role::Admin));
    }
}
