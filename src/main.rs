// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wallet_authorization_server::{
    api::router,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    retention::RetentionSweeper,
    state::AppState,
    storage::{seed_project, AuthDatabase, DATABASE_FILE},
};

/// Time allowed for in-flight requests after Ctrl-C.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    let db = AuthDatabase::open(&config.data_dir.join(DATABASE_FILE))
        .expect("Failed to open authorization database");
    let state = AppState::new(Arc::new(db));

    if let Some(seed) = &config.seed_project {
        match seed_project(state.projects.as_ref(), &seed.api_key, &seed.base_redirect_url, Utc::now()) {
            Ok(project) => info!(project_id = %project.id, "Seeded project"),
            Err(e) => {
                error!(error = %e, "Failed to seed project");
                std::process::exit(1);
            }
        }
    }

    let shutdown = CancellationToken::new();
    let sweeper = RetentionSweeper::new(
        state.service.clone(),
        config.retention_ttl,
        config.retention_interval,
    );
    let sweeper_task = tokio::spawn(sweeper.run(shutdown.clone()));

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
            info!("Shutdown signal received");
            shutdown.cancel();
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
        }
    });

    let app = router(state);
    let addr = config.bind_addr;

    let result = match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .expect("Failed to load TLS certificate and key");
            info!(%addr, "Wallet authorization server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!(%addr, "Wallet authorization server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    shutdown.cancel();
    if let Err(e) = sweeper_task.await {
        warn!(error = %e, "Retention sweeper task failed");
    }

    if let Err(e) = result {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
    info!("Server stopped");
}
