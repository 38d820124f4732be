// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository contracts and persisted record types.
//!
//! Each contract is implemented by both backends: [`super::AuthDatabase`]
//! (redb) and [`super::InMemoryRepository`].

pub mod authorization;
pub mod projects;

pub use authorization::{AuthorizationRequestRepository, StoredAuthorizationRequest};
pub use projects::{
    hash_api_key, project_id_for_api_key, seed_project, InvalidBaseRedirectUrl, Project,
    ProjectRepository, SeedError,
};
