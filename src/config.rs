// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`Config`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding `authorization.redb` | `/data` |
//! | `HOST` | Server bind address (IPv4 or IPv6) | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `TLS_CERT_PATH` | PEM certificate chain; HTTPS when set with the key | unset |
//! | `TLS_KEY_PATH` | PEM private key | unset |
//! | `RETENTION_TTL_SECS` | Age after which temporary requests are purged | `86400` |
//! | `RETENTION_INTERVAL_SECS` | Retention sweep interval | `300` |
//! | `SEED_API_KEY` | API key of a project created at startup | unset |
//! | `SEED_BASE_REDIRECT_URL` | Base redirect URL of the seeded project | unset |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "/data";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

pub const RETENTION_TTL_SECS_ENV: &str = "RETENTION_TTL_SECS";
pub const RETENTION_INTERVAL_SECS_ENV: &str = "RETENTION_INTERVAL_SECS";
pub const DEFAULT_RETENTION_TTL_SECS: u64 = 86_400;
pub const DEFAULT_RETENTION_INTERVAL_SECS: u64 = 300;

pub const SEED_API_KEY_ENV: &str = "SEED_API_KEY";
pub const SEED_BASE_REDIRECT_URL_ENV: &str = "SEED_BASE_REDIRECT_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got `{value}`")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// PEM files for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Project created (or refreshed) at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedProject {
    pub api_key: String,
    pub base_redirect_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub tls: Option<TlsPaths>,
    pub retention_ttl: Duration,
    pub retention_interval: Duration,
    pub seed_project: Option<SeedProject>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = PathBuf::from(var(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(var(PORT_ENV), PORT_ENV, "port number", DEFAULT_PORT)?;
        let ip: IpAddr = host.parse().map_err(|_| ConfigError::InvalidValue {
            name: HOST_ENV,
            expected: "IP address",
            value: host.clone(),
        })?;
        let bind_addr = SocketAddr::from((ip, port));

        let log_format = match var(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: LOG_FORMAT_ENV,
                    expected: "log format (json or pretty)",
                    value: other.to_string(),
                })
            }
        };

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        let retention_ttl = Duration::from_secs(parse_or(
            var(RETENTION_TTL_SECS_ENV),
            RETENTION_TTL_SECS_ENV,
            "number of seconds",
            DEFAULT_RETENTION_TTL_SECS,
        )?);
        let retention_interval = Duration::from_secs(parse_or(
            var(RETENTION_INTERVAL_SECS_ENV),
            RETENTION_INTERVAL_SECS_ENV,
            "number of seconds",
            DEFAULT_RETENTION_INTERVAL_SECS,
        )?);
        if retention_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: RETENTION_INTERVAL_SECS_ENV,
                expected: "positive number of seconds",
                value: "0".to_string(),
            });
        }

        let seed_project = match (var(SEED_API_KEY_ENV), var(SEED_BASE_REDIRECT_URL_ENV)) {
            (Some(api_key), Some(base_redirect_url)) => Some(SeedProject {
                api_key,
                base_redirect_url,
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Incomplete(
                    SEED_API_KEY_ENV,
                    SEED_BASE_REDIRECT_URL_ENV,
                ))
            }
        };

        Ok(Self {
            data_dir,
            bind_addr,
            log_format,
            tls,
            retention_ttl,
            retention_interval,
            seed_project,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name,
            expected,
            value: raw,
        }),
        None => Ok(default),
    }
}
