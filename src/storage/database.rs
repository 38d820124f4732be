// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded authorization database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `authorization_requests`: request id → serialized StoredAuthorizationRequest
//! - `project_request_index`: composite key (project|created_at|request id) → request id
//! - `projects`: project id → serialized Project
//! - `api_keys`: SHA-256 hex of the API key → project id
//!
//! ## Atomicity
//!
//! redb runs at most one write transaction at a time. Every mutation here
//! (insert, conditional attach, retention delete) checks and writes inside a
//! single write transaction, so concurrent attaches on the same id are
//! linearized and only the first one finds the signature slot empty.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use uuid::Uuid;

use super::repository::{
    hash_api_key, AuthorizationRequestRepository, Project, ProjectRepository,
    StoredAuthorizationRequest,
};
use super::{RepositoryError, RepositoryResult};
use crate::authorization::AuthorizationRequest;
use crate::models::{AuthorizationRequestId, ProjectId, SignedMessage, WalletAddress};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: request id → serialized StoredAuthorizationRequest (JSON bytes).
const AUTHORIZATION_REQUESTS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("authorization_requests");

/// Index: composite key → request id.
/// Key format: `project_id (16) | created_at_secs_be (8) | created_at_nanos_be (4) | request_id (16)`.
const PROJECT_REQUEST_INDEX: TableDefinition<&[u8], &str> =
    TableDefinition::new("project_request_index");

/// Projects: project id → serialized Project (JSON bytes).
const PROJECTS: TableDefinition<&str, &[u8]> = TableDefinition::new("projects");

/// API keys: SHA-256 hex digest → project id.
const API_KEYS: TableDefinition<&str, &str> = TableDefinition::new("api_keys");

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "authorization.redb";

// =============================================================================
// Index Key Helpers
// =============================================================================

const INDEX_KEY_LEN: usize = 16 + 8 + 4 + 16;

/// Build a composite key for the project_request_index table.
///
/// `created_at` is stored as seconds (sign bit flipped, so big-endian byte
/// order matches chronological order before 1970 too) followed by the
/// sub-second nanoseconds, keeping the full precision of the record.
fn make_index_key(project_id: ProjectId, created_at: DateTime<Utc>, id: AuthorizationRequestId) -> Vec<u8> {
    let mut key = Vec::with_capacity(INDEX_KEY_LEN);
    key.extend_from_slice(project_id.0.as_bytes());
    let secs = (created_at.timestamp() as u64) ^ (1 << 63);
    key.extend_from_slice(&secs.to_be_bytes());
    key.extend_from_slice(&created_at.timestamp_subsec_nanos().to_be_bytes());
    key.extend_from_slice(id.0.as_bytes());
    key
}

/// Inclusive bounds covering every index key of a project.
fn project_range(project_id: ProjectId) -> (Vec<u8>, Vec<u8>) {
    let mut start = Vec::with_capacity(INDEX_KEY_LEN);
    start.extend_from_slice(project_id.0.as_bytes());
    let mut end = start.clone();
    start.extend_from_slice(&[0x00; INDEX_KEY_LEN - 16]);
    end.extend_from_slice(&[0xFF; INDEX_KEY_LEN - 16]);
    (start, end)
}

fn parse_project_id(raw: &str) -> RepositoryResult<ProjectId> {
    Uuid::parse_str(raw)
        .map(ProjectId)
        .map_err(|e| RepositoryError::Corrupted {
            id: raw.to_string(),
            reason: format!("invalid project id: {e}"),
        })
}

// =============================================================================
// AuthDatabase
// =============================================================================

/// Embedded ACID database holding authorization requests and projects.
pub struct AuthDatabase {
    db: Database,
}

impl AuthDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> RepositoryResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(AUTHORIZATION_REQUESTS)?;
            let _ = write_txn.open_table(PROJECT_REQUEST_INDEX)?;
            let _ = write_txn.open_table(PROJECTS)?;
            let _ = write_txn.open_table(API_KEYS)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Authorization database opened");
        Ok(Self { db })
    }

    /// Verify that a read transaction can be opened.
    pub fn health_check(&self) -> RepositoryResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(AUTHORIZATION_REQUESTS)?;
        Ok(())
    }
}

impl AuthorizationRequestRepository for AuthDatabase {
    fn store(&self, request: &AuthorizationRequest) -> RepositoryResult<()> {
        let record = StoredAuthorizationRequest::from(request);
        let json = serde_json::to_vec(&record)?;
        let key = request.id.0.to_string();
        let index_key = make_index_key(request.project_id, request.created_at, request.id);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(AUTHORIZATION_REQUESTS)?;
            if table.get(key.as_str())?.is_some() {
                return Err(RepositoryError::DuplicateId(request.id));
            }
            table.insert(key.as_str(), json.as_slice())?;

            let mut index = write_txn.open_table(PROJECT_REQUEST_INDEX)?;
            index.insert(index_key.as_slice(), key.as_str())?;
        }
        write_txn.commit()?;

        tracing::debug!(request_id = %request.id, "Stored authorization request");
        Ok(())
    }

    fn get_by_id(&self, id: AuthorizationRequestId) -> RepositoryResult<Option<AuthorizationRequest>> {
        let key = id.0.to_string();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AUTHORIZATION_REQUESTS)?;
        match table.get(key.as_str())? {
            Some(value) => {
                let record: StoredAuthorizationRequest = serde_json::from_slice(value.value())?;
                Ok(Some(record.try_into()?))
            }
            None => Ok(None),
        }
    }

    fn list_by_project(&self, project_id: ProjectId) -> RepositoryResult<Vec<AuthorizationRequest>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(PROJECT_REQUEST_INDEX)?;
        let table = read_txn.open_table(AUTHORIZATION_REQUESTS)?;

        let (start, end) = project_range(project_id);
        let mut requests = Vec::new();

        for entry in index.range(start.as_slice()..=end.as_slice())? {
            let (_, request_id) = entry?;
            if let Some(value) = table.get(request_id.value())? {
                let record: StoredAuthorizationRequest = serde_json::from_slice(value.value())?;
                requests.push(record.try_into()?);
            }
        }

        Ok(requests)
    }

    fn attach_signature(
        &self,
        id: AuthorizationRequestId,
        wallet_address: WalletAddress,
        signed_message: &SignedMessage,
    ) -> RepositoryResult<()> {
        let key = id.0.to_string();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(AUTHORIZATION_REQUESTS)?;

            let existing_bytes = {
                let existing = table.get(key.as_str())?.ok_or(RepositoryError::NotFound(id))?;
                existing.value().to_vec()
            };

            let mut record: StoredAuthorizationRequest = serde_json::from_slice(&existing_bytes)?;
            record.attach_signature(wallet_address, signed_message)?;

            let json = serde_json::to_vec(&record)?;
            table.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete_expired(&self, cutoff: DateTime<Utc>) -> RepositoryResult<usize> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(AUTHORIZATION_REQUESTS)?;
            let mut index = write_txn.open_table(PROJECT_REQUEST_INDEX)?;

            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let record: StoredAuthorizationRequest = match serde_json::from_slice(value.value()) {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::warn!(
                            request_id = %key.value(),
                            error = %e,
                            "Skipping unreadable authorization request during retention sweep"
                        );
                        continue;
                    }
                };
                if record.is_expired(cutoff) {
                    expired.push(record);
                }
            }

            for record in &expired {
                table.remove(record.id.0.to_string().as_str())?;
                let index_key = make_index_key(record.project_id, record.created_at, record.id);
                index.remove(index_key.as_slice())?;
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(deleted)
    }
}

impl ProjectRepository for AuthDatabase {
    fn store_project(&self, project: &Project, api_key: &str) -> RepositoryResult<()> {
        let digest = hash_api_key(api_key);
        let project_key = project.id.0.to_string();
        let json = serde_json::to_vec(project)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut keys = write_txn.open_table(API_KEYS)?;
            let owner = keys.get(digest.as_str())?.map(|v| v.value().to_string());
            if owner.is_some_and(|owner| owner != project_key) {
                return Err(RepositoryError::DuplicateApiKey);
            }
            keys.insert(digest.as_str(), project_key.as_str())?;

            let mut projects = write_txn.open_table(PROJECTS)?;
            projects.insert(project_key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepositoryResult<Option<Project>> {
        let key = id.0.to_string();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROJECTS)?;
        match table.get(key.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_project_by_api_key(&self, api_key: &str) -> RepositoryResult<Option<Project>> {
        let digest = hash_api_key(api_key);
        let project_id = {
            let read_txn = self.db.begin_read()?;
            let keys = read_txn.open_table(API_KEYS)?;
            match keys.get(digest.as_str())? {
                Some(v) => parse_project_id(v.value())?,
                None => return Ok(None),
            }
        };
        self.get_project(project_id)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScreenConfig;
    use std::sync::Arc;

    fn temp_db() -> (AuthDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = AuthDatabase::open(&dir.path().join(DATABASE_FILE)).unwrap();
        (db, dir)
    }

    fn sample_request(project_id: ProjectId, created_at: DateTime<Utc>) -> AuthorizationRequest {
        AuthorizationRequest {
            id: AuthorizationRequestId(Uuid::new_v4()),
            project_id,
            redirect_url: "https://example.com/cb".to_string(),
            message_to_sign_override: None,
            store_indefinitely: true,
            requested_wallet_address: None,
            signature: None,
            arbitrary_data: Some(serde_json::json!({ "test": true })),
            screen_config: ScreenConfig {
                before_action_message: Some("before".to_string()),
                after_action_message: None,
            },
            created_at,
        }
    }

    fn wallet(last: u8) -> WalletAddress {
        format!("0x{:040x}", last).parse().unwrap()
    }

    #[test]
    fn store_and_get_request() {
        let (db, _dir) = temp_db();
        let request = sample_request(ProjectId(Uuid::new_v4()), Utc::now());
        db.store(&request).unwrap();

        let loaded = db.get_by_id(request.id).unwrap().unwrap();
        assert_eq!(loaded, request);
        assert!(db.get_by_id(AuthorizationRequestId(Uuid::new_v4())).unwrap().is_none());
    }

    #[test]
    fn duplicate_id_rejected() {
        let (db, _dir) = temp_db();
        let request = sample_request(ProjectId(Uuid::new_v4()), Utc::now());
        db.store(&request).unwrap();

        let result = db.store(&request);
        assert!(matches!(result, Err(RepositoryError::DuplicateId(id)) if id == request.id));
    }

    #[test]
    fn list_by_project_is_ordered_and_scoped() {
        let (db, _dir) = temp_db();
        let project = ProjectId(Uuid::new_v4());
        let other = ProjectId(Uuid::new_v4());
        let now = Utc::now();

        let newer = sample_request(project, now);
        let older = sample_request(project, now - chrono::Duration::seconds(10));
        let foreign = sample_request(other, now);
        db.store(&newer).unwrap();
        db.store(&foreign).unwrap();
        db.store(&older).unwrap();

        let listed = db.list_by_project(project).unwrap();
        assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![older.id, newer.id]);
        assert_eq!(db.list_by_project(other).unwrap().len(), 1);
        assert!(db.list_by_project(ProjectId(Uuid::new_v4())).unwrap().is_empty());
    }

    #[test]
    fn attach_signature_first_writer_wins() {
        let (db, _dir) = temp_db();
        let request = sample_request(ProjectId(Uuid::new_v4()), Utc::now());
        db.store(&request).unwrap();

        db.attach_signature(request.id, wallet(1), &"first".into()).unwrap();
        let result = db.attach_signature(request.id, wallet(2), &"second".into());
        assert!(matches!(result, Err(RepositoryError::AlreadySet(_))));

        let loaded = db.get_by_id(request.id).unwrap().unwrap();
        assert_eq!(loaded.actual_wallet_address(), Some(wallet(1)));
        assert_eq!(loaded.signed_message(), Some(&"first".into()));
    }

    #[test]
    fn attach_signature_unknown_id() {
        let (db, _dir) = temp_db();
        let id = AuthorizationRequestId(Uuid::new_v4());
        let result = db.attach_signature(id, wallet(1), &"sig".into());
        assert!(matches!(result, Err(RepositoryError::NotFound(missing)) if missing == id));
    }

    #[test]
    fn concurrent_attach_has_single_winner() {
        let (db, _dir) = temp_db();
        let db = Arc::new(db);
        let request = sample_request(ProjectId(Uuid::new_v4()), Utc::now());
        db.store(&request).unwrap();

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || {
                    let signature = SignedMessage(format!("sig-{i}"));
                    db.attach_signature(request.id, wallet(i + 1), &signature)
                        .map(|_| (wallet(i + 1), signature))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, RepositoryError::AlreadySet(_))));

        let (winning_wallet, winning_signature) = winners[0];
        let loaded = db.get_by_id(request.id).unwrap().unwrap();
        assert_eq!(loaded.actual_wallet_address(), Some(*winning_wallet));
        assert_eq!(loaded.signed_message(), Some(winning_signature));
    }

    #[test]
    fn delete_expired_respects_store_indefinitely() {
        let (db, _dir) = temp_db();
        let project = ProjectId(Uuid::new_v4());
        let now = Utc::now();

        let mut old_temporary = sample_request(project, now - chrono::Duration::hours(2));
        old_temporary.store_indefinitely = false;
        let old_permanent = sample_request(project, now - chrono::Duration::hours(2));
        let mut fresh_temporary = sample_request(project, now);
        fresh_temporary.store_indefinitely = false;

        for request in [&old_temporary, &old_permanent, &fresh_temporary] {
            db.store(request).unwrap();
        }

        let deleted = db.delete_expired(now - chrono::Duration::hours(1)).unwrap();
        assert_eq!(deleted, 1);
        assert!(db.get_by_id(old_temporary.id).unwrap().is_none());
        assert!(db.get_by_id(old_permanent.id).unwrap().is_some());
        assert!(db.get_by_id(fresh_temporary.id).unwrap().is_some());
        assert_eq!(db.list_by_project(project).unwrap().len(), 2);
    }

    #[test]
    fn project_and_api_key_lookup() {
        let (db, _dir) = temp_db();
        let project = Project::new(ProjectId(Uuid::new_v4()), "https://example.com", Utc::now()).unwrap();
        db.store_project(&project, "secret-key").unwrap();

        assert_eq!(db.get_project(project.id).unwrap(), Some(project.clone()));
        assert_eq!(db.get_project_by_api_key("secret-key").unwrap(), Some(project.clone()));
        assert!(db.get_project_by_api_key("wrong-key").unwrap().is_none());

        // Re-registering the same key for the same project is fine.
        db.store_project(&project, "secret-key").unwrap();

        let other = Project::new(ProjectId(Uuid::new_v4()), "https://other.example", Utc::now()).unwrap();
        assert!(matches!(
            db.store_project(&other, "secret-key"),
            Err(RepositoryError::DuplicateApiKey)
        ));
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DATABASE_FILE);
        let request = sample_request(ProjectId(Uuid::new_v4()), Utc::now());
        {
            let db = AuthDatabase::open(&path).unwrap();
            db.store(&request).unwrap();
            db.attach_signature(request.id, wallet(7), &"sig".into()).unwrap();
        }
        let db = AuthDatabase::open(&path).unwrap();
        let loaded = db.get_by_id(request.id).unwrap().unwrap();
        assert_eq!(loaded.actual_wallet_address(), Some(wallet(7)));
        db.health_check().unwrap();
    }

    #[test]
    fn list_orders_within_the_same_millisecond() {
        let (db, _dir) = temp_db();
        let project = ProjectId(Uuid::new_v4());
        let base = Utc::now();

        let mut older = sample_request(project, base + chrono::Duration::microseconds(100));
        older.id = AuthorizationRequestId(Uuid::from_u128(u128::MAX));
        let mut newer = sample_request(project, base + chrono::Duration::microseconds(600));
        newer.id = AuthorizationRequestId(Uuid::from_u128(0));
        db.store(&older).unwrap();
        db.store(&newer).unwrap();

        let ids: Vec<_> = db.list_by_project(project).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[test]
    fn index_key_orders_sub_second_and_pre_epoch_times() {
        let project = ProjectId(Uuid::new_v4());
        let id = AuthorizationRequestId(Uuid::new_v4());
        let t = Utc::now();
        let a = make_index_key(project, t, id);
        let b = make_index_key(project, t + chrono::Duration::nanoseconds(1), id);
        assert!(a < b);

        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        let before = make_index_key(project, epoch - chrono::Duration::milliseconds(1), id);
        let after = make_index_key(project, epoch, id);
        assert!(before < after);
    }

    #[test]
    fn index_key_ordering() {
        let project = ProjectId(Uuid::new_v4());
        let id = AuthorizationRequestId(Uuid::new_v4());
        let t = Utc::now();
        let earlier = make_index_key(project, t - chrono::Duration::seconds(1), id);
        let later = make_index_key(project, t, id);
        assert!(earlier < later, "Older timestamps should sort first");
        assert_eq!(later.len(), INDEX_KEY_LEN);
    }
}
