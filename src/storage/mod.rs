// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for authorization requests and projects. Two backends
//! implement the repository contracts in [`repository`]:
//!
//! - [`AuthDatabase`]: embedded redb file, used by the server
//! - [`InMemoryRepository`]: process-local maps, used by tests
//!
//! ## Storage Layout
//!
//! ```text
//! /data/
//!   authorization.redb   # requests, project index, projects, API keys
//! ```
//!
//! ## Important Notes
//!
//! - API keys are never stored in clear text, only their SHA-256 digest
//! - Attaching a signature is a conditional update; the first writer wins

pub mod database;
pub mod error;
pub mod memory;
pub mod repository;

pub use database::{AuthDatabase, DATABASE_FILE};
pub use error::{RepositoryError, RepositoryResult};
pub use memory::InMemoryRepository;
pub use repository::{
    hash_api_key, project_id_for_api_key, seed_project, AuthorizationRequestRepository,
    InvalidBaseRedirectUrl, Project, ProjectRepository, SeedError, StoredAuthorizationRequest,
};
