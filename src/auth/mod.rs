// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication and role-based authorization.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to `/api/auth/login`
//! 2. The credential directory checks them and the token codec issues a
//!    signed, time-bounded token carrying the subject and its roles
//! 3. Client sends `Authorization: Bearer <token>` on every other request
//! 4. The authentication middleware verifies the token and binds the
//!    resulting principal to the request
//! 5. The policy layer checks the route's required role before the handler
//!    runs
//!
//! ## Security
//!
//! - Single issuer, single HS256 key, no server-side session state
//! - Every unauthorized outcome produces the same 401 response
//! - Wrong role for a valid principal produces 403
//! - No clock skew tolerance unless configured

pub mod claims;
pub mod codec;
pub mod directory;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod policy;
pub mod roles;

pub use claims::{Principal, TokenClaims};
pub use codec::{IssuedToken, TokenCodec};
pub use directory::{CredentialDirectory, CredentialEntry, CredentialRecord, DirectoryError};
pub use error::AuthError;
pub use extractor::{Auth, AuthContext};
pub use middleware::{authenticate, secure, PublicPaths};
pub use policy::{authorize, enforce, Decision, PolicyTable};
pub use roles::Role;
