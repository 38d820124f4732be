// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Project API keys for the Wallet Authorization API.
//!
//! ## Auth Flow
//!
//! 1. A project sends `X-API-KEY: <key>`
//! 2. The server hashes the key (SHA-256) and looks up the owning project
//! 3. Handlers receive the [`Project`](crate::storage::Project) via [`ApiKey`]
//!
//! ## Scope
//!
//! - Create and list-by-project require a key
//! - Fetch-by-id and attach are open; the request UUID is the access token
//! - Listing is restricted to the key's own project

pub mod api_key;
pub mod error;

pub use api_key::{ApiKey, API_KEY_HEADER};
pub use error::AuthError;
