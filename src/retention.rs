// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Retention Sweeper
//!
//! Background task that deletes authorization requests created with
//! `store_indefinitely = false` once they are older than the configured TTL.
//! Reads never delete anything; this task is the only place records go away.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::authorization::AuthorizationRequestService;

pub struct RetentionSweeper {
    service: Arc<AuthorizationRequestService>,
    ttl: Duration,
    interval: Duration,
}

impl RetentionSweeper {
    pub fn new(service: Arc<AuthorizationRequestService>, ttl: Duration, interval: Duration) -> Self {
        Self {
            service,
            ttl,
            interval,
        }
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            ttl_secs = self.ttl.as_secs(),
            interval_secs = self.interval.as_secs(),
            "Retention sweeper starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Retention sweeper shutting down");
                return;
            }

            self.sweep();

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Retention sweeper shutting down");
                    return;
                }
            }
        }
    }

    /// Delete everything that expired before now minus the TTL.
    /// Returns the number of deleted requests.
    pub fn sweep(&self) -> usize {
        let ttl = match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => ttl,
            Err(e) => {
                warn!(error = %e, "Retention TTL out of range, skipping sweep");
                return 0;
            }
        };
        let Some(cutoff) = self.service.clock().now().checked_sub_signed(ttl) else {
            return 0;
        };

        match self.service.purge_expired(cutoff) {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(error = %e, "Retention sweep failed");
                0
            }
        }
    }
}
