// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential directory.
//!
//! Maps a login to its stored secret and role set. The directory is built
//! once at startup and is read-only afterwards, so it can be shared across
//! request tasks behind an `Arc` without locking.
//!
//! ## Security
//!
//! - Secrets are kept as HMAC-SHA256 digests under a per-process random key
//! - Digest comparison is constant time
//! - Unknown logins still pay for one digest comparison
//!
//! The directory is consulted only by the login endpoint. Token
//! verification never reads it.

use std::collections::{BTreeSet, HashMap};

use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use thiserror::Error;

use super::{AuthError, Role};

type HmacSha256 = Hmac<Sha256>;

/// Size of the per-process digest key.
const DIGEST_KEY_LEN: usize = 32;

/// Errors raised while building a directory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("login must not be empty")]
    EmptyLogin,
    #[error("duplicate login: {0}")]
    DuplicateLogin(String),
    #[error("login {0} has no roles")]
    EmptyRoles(String),
    #[error("unknown role {role:?} for login {login}")]
    UnknownRole { login: String, role: String },
    #[error("malformed credential entry #{0} (expected login:secret:ROLE[,ROLE...])")]
    MalformedEntry(usize),
    #[error("failed to generate digest key")]
    KeyGeneration,
}

/// Input for one credential record.
#[derive(Clone)]
pub struct CredentialEntry {
    pub login: String,
    pub secret: String,
    pub roles: BTreeSet<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl CredentialEntry {
    pub fn new(
        login: impl Into<String>,
        secret: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            login: login.into(),
            secret: secret.into(),
            roles: roles.into_iter().collect(),
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }
}

/// A stored credential.
#[derive(Clone)]
pub struct CredentialRecord {
    pub login: String,
    pub roles: BTreeSet<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    secret_digest: Vec<u8>,
}

impl CredentialRecord {
    /// "First Last", or whichever part is present.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("login", &self.login)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Read-only login directory.
pub struct CredentialDirectory {
    digest_key: [u8; DIGEST_KEY_LEN],
    decoy_digest: Vec<u8>,
    records: HashMap<String, CredentialRecord>,
}

impl CredentialDirectory {
    /// Build a directory from entries.
    ///
    /// Fails on an empty login, a duplicate login or an empty role set.
    pub fn from_entries(
        entries: impl IntoIterator<Item = CredentialEntry>,
    ) -> Result<Self, DirectoryError> {
        let rng = SystemRandom::new();

        let mut digest_key = [0u8; DIGEST_KEY_LEN];
        rng.fill(&mut digest_key)
            .map_err(|_| DirectoryError::KeyGeneration)?;

        let mut decoy_secret = [0u8; DIGEST_KEY_LEN];
        rng.fill(&mut decoy_secret)
            .map_err(|_| DirectoryError::KeyGeneration)?;

        let mut directory = Self {
            digest_key,
            decoy_digest: Vec::new(),
            records: HashMap::new(),
        };
        directory.decoy_digest = directory
            .digest(&decoy_secret)
            .map_err(|_| DirectoryError::KeyGeneration)?;

        for entry in entries {
            directory.insert(entry)?;
        }

        Ok(directory)
    }

    /// Parse `login:secret:ROLE[,ROLE...]` entries separated by `;`.
    ///
    /// The secret may itself contain `:`; the first colon ends the login and
    /// the last one starts the role list.
    pub fn parse(input: &str) -> Result<Self, DirectoryError> {
        let mut entries = Vec::new();

        for (index, raw) in input
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
        {
            let (login, rest) = raw
                .split_once(':')
                .ok_or(DirectoryError::MalformedEntry(index))?;
            let login = login.trim();
            let (secret, roles) = rest
                .rsplit_once(':')
                .ok_or(DirectoryError::MalformedEntry(index))?;

            let roles = roles
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|tag| {
                    Role::parse(tag).ok_or_else(|| DirectoryError::UnknownRole {
                        login: login.to_string(),
                        role: tag.to_string(),
                    })
                })
                .collect::<Result<BTreeSet<_>, _>>()?;

            entries.push(CredentialEntry {
                login: login.to_string(),
                secret: secret.to_string(),
                roles,
                first_name: None,
                last_name: None,
            });
        }

        Self::from_entries(entries)
    }

    /// Demo directory: `peter` (USER) and `ivan` (ADMIN), secret `password`.
    pub fn demo() -> Result<Self, DirectoryError> {
        Self::from_entries([
            CredentialEntry::new("peter", "password", [Role::User]).with_name("Peter", "Smith"),
            CredentialEntry::new("ivan", "password", [Role::Admin]).with_name("Ivan", "Ivanov"),
        ])
    }

    fn insert(&mut self, entry: CredentialEntry) -> Result<(), DirectoryError> {
        if entry.login.is_empty() {
            return Err(DirectoryError::EmptyLogin);
        }
        if entry.roles.is_empty() {
            return Err(DirectoryError::EmptyRoles(entry.login));
        }
        if self.records.contains_key(&entry.login) {
            return Err(DirectoryError::DuplicateLogin(entry.login));
        }

        let secret_digest = self
            .digest(entry.secret.as_bytes())
            .map_err(|_| DirectoryError::KeyGeneration)?;

        self.records.insert(
            entry.login.clone(),
            CredentialRecord {
                login: entry.login,
                roles: entry.roles,
                first_name: entry.first_name,
                last_name: entry.last_name,
                secret_digest,
            },
        );
        Ok(())
    }

    fn mac(&self) -> Result<HmacSha256, hmac::digest::InvalidLength> {
        HmacSha256::new_from_slice(&self.digest_key)
    }

    fn digest(&self, secret: &[u8]) -> Result<Vec<u8>, hmac::digest::InvalidLength> {
        let mut mac = self.mac()?;
        mac.update(secret);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, login: &str) -> Option<&CredentialRecord> {
        self.records.get(login)
    }

    /// Check a login/secret pair.
    pub fn authenticate(&self, login: &str, secret: &str) -> Result<&CredentialRecord, AuthError> {
        let record = self.lookup(login);
        let expected = record
            .map(|r| r.secret_digest.as_slice())
            .unwrap_or(self.decoy_digest.as_slice());

        let mut mac = self
            .mac()
            .map_err(|e| AuthError::Internal(format!("digest key: {e}")))?;
        mac.update(secret.as_bytes());
        let matches = mac.verify_slice(expected).is_ok();

        match record {
            None => Err(AuthError::UnknownLogin),
            Some(_) if !matches => Err(AuthError::CredentialMismatch),
            Some(record) => Ok(record),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl std::fmt::Debug for CredentialDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialDirectory")
            .field("logins", &self.records.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_directory_has_peter_and_ivan() {
        let directory = CredentialDirectory::demo().unwrap();
        assert_eq!(directory.len(), 2);

        let peter = directory.lookup("peter").unwrap();
        assert_eq!(peter.roles, BTreeSet::from([Role::User]));
        assert_eq!(peter.display_name().as_deref(), Some("Peter Smith"));

        let ivan = directory.lookup("ivan").unwrap();
        assert_eq!(ivan.roles, BTreeSet::from([Role::Admin]));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let directory = CredentialDirectory::demo().unwrap();
        assert!(directory.lookup("Peter").is_none());
        assert!(directory.lookup("peter ").is_none());
    }

    #[test]
    fn authenticate_distinguishes_failures_internally() {
        let directory = CredentialDirectory::demo().unwrap();

        let record = directory.authenticate("ivan", "password").unwrap();
        assert_eq!(record.login, "ivan");

        assert!(matches!(
            directory.authenticate("ivan", "Password"),
            Err(AuthError::CredentialMismatch)
        ));
        assert!(matches!(
            directory.authenticate("nobody", "password"),
            Err(AuthError::UnknownLogin)
        ));
    }

    #[test]
    fn rejects_duplicate_and_roleless_entries() {
        let duplicate = CredentialDirectory::from_entries([
            CredentialEntry::new("peter", "a", [Role::User]),
            CredentialEntry::new("peter", "b", [Role::Admin]),
        ]);
        assert_eq!(
            duplicate.unwrap_err(),
            DirectoryError::DuplicateLogin("peter".into())
        );

        let roleless = CredentialDirectory::from_entries([CredentialEntry::new("x", "y", [])]);
        assert_eq!(roleless.unwrap_err(), DirectoryError::EmptyRoles("x".into()));

        let nameless = CredentialDirectory::from_entries([CredentialEntry::new("", "y", [Role::User])]);
        assert_eq!(nameless.unwrap_err(), DirectoryError::EmptyLogin);
    }

    #[test]
    fn parse_reads_entries() {
        let directory =
            CredentialDirectory::parse("peter:pw:USER; ivan:s3:cr:et:ROLE_ADMIN,user;").unwrap();

        assert_eq!(directory.len(), 2);
        assert!(directory.authenticate("peter", "pw").is_ok());

        let ivan = directory.authenticate("ivan", "s3:cr:et").unwrap();
        assert_eq!(ivan.roles, BTreeSet::from([Role::User, Role::Admin]));
        assert_eq!(ivan.display_name(), None);
    }

    #[test]
    fn parse_rejects_bad_entries() {
        assert_eq!(
            CredentialDirectory::parse("peter").unwrap_err(),
            DirectoryError::MalformedEntry(0)
        );
        assert_eq!(
            CredentialDirectory::parse("peter:pw:ROOT").unwrap_err(),
            DirectoryError::UnknownRole {
                login: "peter".into(),
                role: "ROOT".into()
            }
        );
        assert_eq!(
            CredentialDirectory::parse(" peter :pw:ROOT").unwrap_err(),
            DirectoryError::UnknownRole {
                login: "peter".into(),
                role: "ROOT".into()
            }
        );
        assert_eq!(
            CredentialDirectory::parse("peter:pw:").unwrap_err(),
            DirectoryError::EmptyRoles("peter".into())
        );
    }

    #[test]
    fn debug_output_omits_secrets() {
        let directory = CredentialDirectory::demo().unwrap();
        let rendered = format!("{:?}", directory.lookup("peter").unwrap());
        assert!(rendered.contains("peter"));
        assert!(!rendered.contains("digest"));
    }
}
