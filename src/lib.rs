// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Authorization - Wallet Ownership Challenges
//!
//! A project asks an end user to prove control of a wallet: the server issues
//! a request with a message to sign, the wallet signs it (EIP-191), and the
//! status derived from the attached signature is exposed to both parties.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Project API key authentication
//! - `authorization` - Request builder, signature verifier, status derivation
//! - `retention` - Background purge of temporary requests
//! - `storage` - redb and in-memory repositories

pub mod api;
pub mod auth;
pub mod authorization;
pub mod config;
pub mod error;
pub mod models;
pub mod retention;
pub mod state;
pub mod storage;
