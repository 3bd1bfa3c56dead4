//! Connection settings.
//!
//! Configuration via environment variables:
//!
//! - `ODOO_URL` - server base URL (required)
//! - `ODOO_DATABASE` - database name
//! - `ODOO_UID` - user id of the established session
//! - `ODOO_PASSWORD` - password or API key
//! - `ODOO_TIMEOUT_SECS` - request timeout (default: 30)
//! - `ODOO_CONNECT_TIMEOUT_SECS` - connect timeout (default: 10)

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use odoo_types::env_utils::{env_secs_or, env_string};

use crate::jsonrpc::{Credentials, JsonRpcClient};

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub url: String,
    pub database: Option<String>,
    pub uid: Option<i64>,
    pub password: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    /// Settings for `url` with default timeouts and no session.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            database: None,
            uid: None,
            password: None,
            timeout: Duration::from_secs(JsonRpcClient::DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(JsonRpcClient::DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Read the settings from `ODOO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let url = env_string("ODOO_URL").ok_or_else(|| anyhow!("ODOO_URL is not set"))?;
        let uid = env_string("ODOO_UID")
            .map(|raw| {
                raw.parse::<i64>()
                    .with_context(|| format!("ODOO_UID is not an integer: {raw}"))
            })
            .transpose()?;
        Ok(Self {
            url,
            database: env_string("ODOO_DATABASE"),
            uid,
            password: env_string("ODOO_PASSWORD"),
            timeout: env_secs_or("ODOO_TIMEOUT_SECS", JsonRpcClient::DEFAULT_TIMEOUT_SECS),
            connect_timeout: env_secs_or(
                "ODOO_CONNECT_TIMEOUT_SECS",
                JsonRpcClient::DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
        })
    }

    /// Session credentials, when database and uid are both known.
    ///
    /// A missing password defaults to empty.
    pub fn credentials(&self) -> Option<Credentials> {
        let database = self.database.as_deref()?;
        let uid = self.uid?;
        Some(Credentials::new(
            database,
            uid,
            self.password.as_deref().unwrap_or(""),
        ))
    }
}
