// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{CredentialDirectory, PolicyTable, PublicPaths, TokenCodec};
use crate::config::{ConfigError, SecurityConfig};

/// Shared, read-only application state.
///
/// Everything in here is built once at startup and never mutated, so
/// concurrent requests share it without locks. Per-request identity lives
/// in request extensions, never here.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<CredentialDirectory>,
    pub codec: Arc<TokenCodec>,
    pub policy: Arc<PolicyTable>,
    pub public_paths: Arc<PublicPaths>,
}

impl AppState {
    /// Build the state, rejecting invalid security configuration.
    pub fn new(
        security: &SecurityConfig,
        directory: CredentialDirectory,
        policy: PolicyTable,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            directory: Arc::new(directory),
            codec: Arc::new(TokenCodec::new(security)?),
            policy: Arc::new(policy),
            public_paths: Arc::new(PublicPaths::new(&security.public_paths)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::TOKEN_TTL_ENV;

    #[test]
    fn invalid_security_config_is_rejected() {
        let mut security = SecurityConfig::new("0123456789abcdef0123456789abcdef");
        security.token_ttl = Duration::from_secs(u64::MAX);

        let result = AppState::new(
            &security,
            CredentialDirectory::demo().unwrap(),
            PolicyTable::new(),
        );
        assert!(matches!(result, Err(ConfigError::Invalid(TOKEN_TTL_ENV))));
    }
}
