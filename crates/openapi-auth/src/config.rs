//! Connection info loading
//!
//! Config precedence: explicit path > `OPENAPI_CONFIG_PATH` > `openapi.toml`.
//! The client secret resolves from the `OPENAPI_CLIENT_SECRET` env var first,
//! then `client_secret_file`, then the inline `client_secret` value.

use std::path::{Path, PathBuf};

use common::Secret;
use serde::Deserialize;
use tracing::info;

use crate::constants::{CLIENT_SECRET_ENV, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use crate::credentials::{ConnectionInfo, Mode, default_timeout};
use crate::token::Token;

/// Root of the TOML config file
#[derive(Debug, Deserialize)]
struct ConfigFile {
    connection: ConnectionSection,
}

/// `[connection]` table
#[derive(Debug, Deserialize)]
struct ConnectionSection {
    #[serde(default)]
    mode: Mode,
    client_id: String,
    #[serde(default)]
    client_secret: Secret<String>,
    /// Path to a file containing the client secret
    #[serde(default)]
    client_secret_file: Option<PathBuf>,
    account_id: i64,
    #[serde(default)]
    token: Option<Token>,
    #[serde(default = "default_timeout")]
    timeout_secs: u64,
}

impl ConnectionInfo {
    /// Load connection info from the `[connection]` table of a TOML file,
    /// then overlay the client secret from the environment.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&contents)?;
        let section = file.connection;
        let client_secret_file = section.client_secret_file;
        let mut info = ConnectionInfo {
            mode: section.mode,
            client_id: section.client_id,
            client_secret: section.client_secret,
            account_id: section.account_id,
            token: section.token,
            timeout_secs: section.timeout_secs,
        };

        if info.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }

        if info.account_id <= 0 {
            return Err(common::Error::Config(format!(
                "account_id must be positive, got: {}",
                info.account_id
            )));
        }

        if info.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if let Ok(secret) = std::env::var(CLIENT_SECRET_ENV) {
            info.client_secret = Secret::new(secret);
        } else if let Some(ref secret_file) = client_secret_file {
            let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read client_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            let secret = secret.trim().to_owned();
            if !secret.is_empty() {
                info.client_secret = Secret::new(secret);
            }
        }

        if info.client_secret.is_blank() {
            return Err(common::Error::Config(format!(
                "client secret missing: set {CLIENT_SECRET_ENV}, client_secret_file, or client_secret"
            )));
        }

        info!(
            path = %path.display(),
            mode = ?info.mode,
            account_id = info.account_id,
            has_token = info.token.is_some(),
            "loaded connection info"
        );

        Ok(info)
    }

    /// Resolve config file path from an explicit path or the env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }
}
