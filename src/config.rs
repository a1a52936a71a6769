// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! immutable configuration structs built from them. Configuration is loaded
//! from the environment once at startup and injected through `AppState`.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `GATE_SIGNING_SECRET` | HS256 token signing key | Required |
//! | `GATE_TOKEN_TTL_SECS` | Token lifetime in seconds | `900` |
//! | `GATE_TOKEN_ISSUER` | Token `iss` claim | `bearer-gate` |
//! | `GATE_CLOCK_LEEWAY_SECS` | Expiry leeway in seconds | `0` |
//! | `GATE_PUBLIC_PATHS` | Comma-separated unauthenticated paths (`*` suffix = prefix) | see [`DEFAULT_PUBLIC_PATHS`] |
//! | `GATE_CREDENTIALS` | `login:secret:ROLE[,ROLE]` entries separated by `;` | Demo directory |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SIGNING_SECRET_ENV: &str = "GATE_SIGNING_SECRET";
pub const TOKEN_TTL_ENV: &str = "GATE_TOKEN_TTL_SECS";
pub const TOKEN_ISSUER_ENV: &str = "GATE_TOKEN_ISSUER";
pub const CLOCK_LEEWAY_ENV: &str = "GATE_CLOCK_LEEWAY_SECS";
pub const PUBLIC_PATHS_ENV: &str = "GATE_PUBLIC_PATHS";
pub const CREDENTIALS_ENV: &str = "GATE_CREDENTIALS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Default token lifetime (15 minutes).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(900);

/// Upper bound on the token lifetime (24 hours).
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(86_400);

pub const DEFAULT_ISSUER: &str = "bearer-gate";

/// Paths that bypass token verification.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/api/auth/login",
    "/health",
    "/health/live",
    "/docs",
    "/docs/*",
    "/api-doc/*",
];

/// Recommended minimum signing secret length in bytes.
const RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Security parameters shared by the token codec and the authentication
/// filter. Built once and never mutated.
#[derive(Clone)]
pub struct SecurityConfig {
    /// HS256 signing key
    pub signing_secret: String,
    /// Token lifetime
    pub token_ttl: Duration,
    /// Expected and issued `iss` claim
    pub issuer: String,
    /// Tolerance applied to the expiry check
    pub clock_leeway: Duration,
    /// Paths that skip token verification
    pub public_paths: Vec<String>,
}

impl SecurityConfig {
    /// Configuration with default policy and the given secret.
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            token_ttl: DEFAULT_TOKEN_TTL,
            issuer: DEFAULT_ISSUER.to_string(),
            clock_leeway: Duration::ZERO,
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_secret.is_empty() {
            return Err(ConfigError::Missing(SIGNING_SECRET_ENV));
        }
        if self.signing_secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                "token signing secret is shorter than recommended ({RECOMMENDED_SECRET_LEN} bytes)"
            );
        }
        if self.token_ttl.is_zero() || self.token_ttl > MAX_TOKEN_TTL {
            return Err(ConfigError::Invalid(TOKEN_TTL_ENV));
        }
        if self.clock_leeway >= self.token_ttl {
            return Err(ConfigError::Invalid(CLOCK_LEEWAY_ENV));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Invalid(TOKEN_ISSUER_ENV));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("token_ttl", &self.token_ttl)
            .field("issuer", &self.issuer)
            .field("clock_leeway", &self.clock_leeway)
            .field("public_paths", &self.public_paths)
            .finish_non_exhaustive()
    }
}

/// Process-level configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub addr: SocketAddr,
    pub log_format: LogFormat,
    pub security: SecurityConfig,
    /// Raw `GATE_CREDENTIALS` value, if set
    pub credentials: Option<String>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host: IpAddr = lookup(HOST_ENV)
            .as_deref()
            .unwrap_or(DEFAULT_HOST)
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(HOST_ENV))?;
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid(PORT_ENV))?,
            None => DEFAULT_PORT,
        };
        let addr = SocketAddr::new(host, port);

        let signing_secret = lookup(SIGNING_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(SIGNING_SECRET_ENV))?;

        let mut security = SecurityConfig::new(signing_secret);

        if let Some(raw) = lookup(TOKEN_TTL_ENV) {
            security.token_ttl = parse_secs(&raw).ok_or(ConfigError::Invalid(TOKEN_TTL_ENV))?;
        }
        if let Some(raw) = lookup(CLOCK_LEEWAY_ENV) {
            security.clock_leeway =
                parse_secs(&raw).ok_or(ConfigError::Invalid(CLOCK_LEEWAY_ENV))?;
        }
        if let Some(issuer) = lookup(TOKEN_ISSUER_ENV) {
            security.issuer = issuer.trim().to_string();
        }
        if let Some(raw) = lookup(PUBLIC_PATHS_ENV) {
            security.public_paths = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        security.validate()?;

        let log_format = lookup(LOG_FORMAT_ENV)
            .map(|s| LogFormat::parse(&s))
            .unwrap_or_default();

        Ok(Self {
            addr,
            log_format,
            security,
            credentials: lookup(CREDENTIALS_ENV).filter(|s| !s.trim().is_empty()),
        })
    }
}

fn parse_secs(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const SECRET: (&str, &str) = (SIGNING_SECRET_ENV, "0123456789abcdef0123456789abcdef");

    #[test]
    fn defaults_apply() {
        let config = load(&[SECRET]).unwrap();

        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.security.token_ttl, DEFAULT_TOKEN_TTL);
        assert_eq!(config.security.clock_leeway, Duration::ZERO);
        assert_eq!(config.security.issuer, DEFAULT_ISSUER);
        assert!(config
            .security
            .public_paths
            .contains(&"/api/auth/login".to_string()));
        assert!(config.credentials.is_none());
    }

    #[test]
    fn signing_secret_is_required() {
        assert_eq!(
            load(&[]).unwrap_err(),
            ConfigError::Missing(SIGNING_SECRET_ENV)
        );
        assert_eq!(
            load(&[(SIGNING_SECRET_ENV, "")]).unwrap_err(),
            ConfigError::Missing(SIGNING_SECRET_ENV)
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            SECRET,
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (TOKEN_TTL_ENV, "60"),
            (CLOCK_LEEWAY_ENV, "5"),
            (TOKEN_ISSUER_ENV, "gate-test"),
            (PUBLIC_PATHS_ENV, "/login, /status*,"),
            (LOG_FORMAT_ENV, "JSON"),
            (CREDENTIALS_ENV, "peter:pw:USER"),
        ])
        .unwrap();

        assert_eq!(config.addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.security.token_ttl, Duration::from_secs(60));
        assert_eq!(config.security.clock_leeway, Duration::from_secs(5));
        assert_eq!(config.security.issuer, "gate-test");
        assert_eq!(config.security.public_paths, vec!["/login", "/status*"]);
        assert_eq!(config.credentials.as_deref(), Some("peter:pw:USER"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            load(&[SECRET, (PORT_ENV, "not-a-port")]).unwrap_err(),
            ConfigError::Invalid(PORT_ENV)
        );
        assert_eq!(
            load(&[SECRET, (TOKEN_TTL_ENV, "0")]).unwrap_err(),
            ConfigError::Invalid(TOKEN_TTL_ENV)
        );
        assert_eq!(
            load(&[SECRET, (TOKEN_TTL_ENV, "100000")]).unwrap_err(),
            ConfigError::Invalid(TOKEN_TTL_ENV)
        );
        assert_eq!(
            load(&[SECRET, (TOKEN_TTL_ENV, "60"), (CLOCK_LEEWAY_ENV, "60")]).unwrap_err(),
            ConfigError::Invalid(CLOCK_LEEWAY_ENV)
        );
        assert_eq!(
            load(&[SECRET, (TOKEN_ISSUER_ENV, "  ")]).unwrap_err(),
            ConfigError::Invalid(TOKEN_ISSUER_ENV)
        );
    }

    #[test]
    fn ipv6_host_is_accepted() {
        let config = load(&[SECRET, (HOST_ENV, "::1"), (PORT_ENV, "9000")]).unwrap();
        assert_eq!(config.addr, "[::1]:9000".parse().unwrap());

        assert_eq!(
            load(&[SECRET, (HOST_ENV, "localhost:80")]).unwrap_err(),
            ConfigError::Invalid(HOST_ENV)
        );
    }

    #[test]
    fn default_docs_entries_do_not_cover_sibling_paths() {
        let config = load(&[SECRET]).unwrap();
        let paths = &config.security.public_paths;

        assert!(paths.contains(&"/docs".to_string()));
        assert!(paths.contains(&"/docs/*".to_string()));
        assert!(!paths.iter().any(|p| p == "/docs*"));
    }

    #[test]
    fn oversized_ttl_fails_validation() {
        let mut config = SecurityConfig::new("0123456789abcdef0123456789abcdef");
        config.token_ttl = Duration::from_secs(u64::MAX);
        assert_eq!(config.validate(), Err(ConfigError::Invalid(TOKEN_TTL_ENV)));
    }

    #[test]
    fn debug_hides_secret() {
        let config = SecurityConfig::new("super-secret-value");
        assert!(!format!("{config:?}").contains("super-secret-value"));
    }
}
