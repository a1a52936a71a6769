// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are compact JWS (HS256) carrying [`TokenClaims`]. The signing key
//! is shared and immutable after startup, so one codec serves every request
//! task concurrently.
//!
//! ## Validity window
//!
//! A token is valid for `iat - leeway <= now < exp + leeway`, with the
//! leeway zero by default. A token whose `exp` equals `now` is expired; one
//! whose `iat` lies ahead of `now` is not yet valid.
//!
//! Both operations take `now` explicitly; callers on the request path pass
//! `Utc::now()`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::error;
use uuid::Uuid;

use super::{claims::TokenClaims, directory::CredentialRecord, AuthError, Role};
use crate::config::{ConfigError, SecurityConfig, CLOCK_LEEWAY_ENV, TOKEN_TTL_ENV};

/// Signing algorithm. Pinned: tokens with any other `alg` are rejected.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded token (`header.payload.signature`)
    pub token: String,
    /// Issued at (Unix seconds)
    pub issued_at: i64,
    /// Expiration (Unix seconds, exclusive)
    pub expires_at: i64,
}

impl IssuedToken {
    pub fn expires_in(&self) -> i64 {
        self.expires_at - self.issued_at
    }
}

/// Issues and verifies signed tokens.
pub struct TokenCodec {
    issuer: String,
    ttl_secs: i64,
    leeway_secs: i64,
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec, validating `config` first.
    pub fn new(config: &SecurityConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let ttl_secs = i64::try_from(config.token_ttl.as_secs())
            .map_err(|_| ConfigError::Invalid(TOKEN_TTL_ENV))?;
        let leeway_secs = i64::try_from(config.clock_leeway.as_secs())
            .map_err(|_| ConfigError::Invalid(CLOCK_LEEWAY_ENV))?;
        let secret = config.signing_secret.as_bytes();

        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against the caller's clock in `verify`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            issuer: config.issuer.clone(),
            ttl_secs,
            leeway_secs,
            header: Header::new(ALGORITHM),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Issue a token for `subject` holding `roles`.
    pub fn issue(
        &self,
        subject: &str,
        roles: &BTreeSet<Role>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        self.sign(subject, roles, None, now)
    }

    /// Issue a token for a directory record, carrying its display name.
    pub fn issue_for(
        &self,
        record: &CredentialRecord,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        self.sign(&record.login, &record.roles, record.display_name(), now)
    }

    fn sign(
        &self,
        subject: &str,
        roles: &BTreeSet<Role>,
        name: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let issued_at = now.timestamp();
        let expires_at = issued_at.saturating_add(self.ttl_secs);

        let claims = TokenClaims {
            sub: subject.to_string(),
            roles: roles.clone(),
            name,
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: expires_at,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&self.header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign token");
            AuthError::Internal(format!("token signing failed: {e}"))
        })?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Verify a token's signature, issuer and validity window, returning its
    /// claims.
    ///
    /// Signature comparison is delegated to the HMAC implementation, which
    /// compares in constant time.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            },
        )?;

        let claims = data.claims;
        let now = now.timestamp();
        if now >= claims.exp.saturating_add(self.leeway_secs) {
            return Err(AuthError::TokenExpired);
        }
        if claims.iat.saturating_sub(self.leeway_secs) > now {
            return Err(AuthError::TokenNotYetValid);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("algorithm", &ALGORITHM)
            .field("ttl_secs", &self.ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}
