// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the authenticated principal.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::roles::Role;

/// Claims carried inside a signed token.
///
/// Field order is the serialization order, and `roles` is a sorted set, so
/// the same logical claims always encode to the same payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (login of the credential record the token was issued for)
    pub sub: String,

    /// Roles granted at issuance
    pub roles: BTreeSet<Role>,

    /// Display name, when the credential record has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds, exclusive)
    pub exp: i64,

    /// Unique token ID
    pub jti: String,
}

/// Identity resolved from a verified token.
///
/// Built only from verified claims; the credential directory is never
/// consulted again once a token has been issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Canonical subject (login)
    pub subject: String,

    /// Granted roles
    pub roles: BTreeSet<Role>,

    /// Display name (if the token carried one)
    pub display_name: Option<String>,
}

impl Principal {
    pub fn new(subject: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            subject: subject.into(),
            roles: roles.into_iter().collect(),
            display_name: None,
        }
    }

    /// Create from verified token claims.
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            subject: claims.sub,
            roles: claims.roles,
            display_name: claims.name,
        }
    }

    /// Exact tag match, no hierarchy.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> TokenClaims {
        TokenClaims {
            sub: "ivan".to_string(),
            roles: BTreeSet::from([Role::Admin]),
            name: Some("Ivan Ivanov".to_string()),
            iss: "bearer-gate".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_000_900,
            jti: "a6a7c3c1-7d1f-4c8e-9b1b-0c7f0f3f1c11".to_string(),
        }
    }

    #[test]
    fn from_claims_keeps_subject_and_roles() {
        let principal = Principal::from_claims(sample_claims());
        assert_eq!(principal.subject, "ivan");
        assert_eq!(principal.roles, BTreeSet::from([Role::Admin]));
        assert_eq!(principal.display_name.as_deref(), Some("Ivan Ivanov"));
    }

    #[test]
    fn admin_does_not_imply_user() {
        let principal = Principal::from_claims(sample_claims());
        assert!(principal.has_role(Role::Admin));
        assert!(!principal.has_role(Role::User));
    }

    #[test]
    fn roles_serialize_sorted() {
        let mut claims = sample_claims();
        claims.roles = BTreeSet::from([Role::Admin, Role::User]);
        claims.name = None;

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["roles"], serde_json::json!(["USER", "ADMIN"]));
        assert!(json.get("name").is_none());
    }
}
