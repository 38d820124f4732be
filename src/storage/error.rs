// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error type shared by all repository backends.

use crate::models::AuthorizationRequestId;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("authorization request {0} already exists")]
    DuplicateId(AuthorizationRequestId),

    #[error("authorization request not found: {0}")]
    NotFound(AuthorizationRequestId),

    /// The conditional attach found a signature already in place.
    #[error("signed message already set for authorization request {0}")]
    AlreadySet(AuthorizationRequestId),

    #[error("API key is already registered to another project")]
    DuplicateApiKey,

    /// A stored record violates an invariant (e.g. half-attached signature).
    #[error("corrupted record {id}: {reason}")]
    Corrupted { id: String, reason: String },

    #[error("storage lock poisoned")]
    LockPoisoned,

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
