// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role tags carried in tokens and checked per operation.
///
/// ## Membership
///
/// Roles are flat tags. A principal holds a role only when that exact tag
/// was assigned: `Admin` does not imply `User`.
///
/// - `User` - Regular authenticated caller
/// - `Admin` - Administrative operations
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular authenticated caller
    User,
    /// Administrative access
    Admin,
}

/// Prefix of the authority form (`ROLE_ADMIN`).
const AUTHORITY_PREFIX: &str = "ROLE_";

impl Role {
    /// All known roles, in tag order.
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    /// Tag as it appears in token claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Parse a role tag (case-insensitive).
    ///
    /// Accepts both the bare tag (`admin`) and the authority form (`ROLE_ADMIN`).
    /// Used when loading credential entries from configuration.
    pub fn parse(s: &str) -> Option<Role> {
        let upper = s.trim().to_ascii_uppercase();
        let tag = upper.strip_prefix(AUTHORITY_PREFIX).unwrap_or(&upper);
        Role::ALL.into_iter().find(|role| role.as_str() == tag)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
