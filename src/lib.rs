// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer Gate - Stateless Request-Authentication Gateway
//!
//! Every inbound request must carry a signed, time-bounded bearer token
//! unless its path is allow-listed. Verified tokens resolve to a principal
//! bound to that request only; protected operations each declare one
//! required role.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers, router and OpenAPI document (Axum)
//! - `auth` - Credential directory, token codec, authentication middleware,
//!   policy engine and request context
//! - `config` - Environment-driven, immutable configuration
//! - `telemetry` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
