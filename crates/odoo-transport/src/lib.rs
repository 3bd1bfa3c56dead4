//! Odoo Transport Layer
//!
//! Everything the dictionary-view engine needs from the network, behind one
//! small trait:
//!
//! - [`Transport`]: `execute_kw` on a model plus the server version
//! - [`jsonrpc`]: blocking JSON-RPC client implementing [`Transport`]
//! - [`config`]: connection settings read from the environment
//!
//! # Example
//!
//! ```ignore
//! use odoo_transport::{ConnectionConfig, JsonRpcClient, Transport};
//!
//! let client = JsonRpcClient::from_config(&ConnectionConfig::from_env()?);
//! let version = client.server_major_version()?;
//! let ids = client.execute_kw("res.partner", "search", vec![json!([])], Default::default())?;
//! ```

pub mod config;
pub mod error;
pub mod jsonrpc;

pub use config::ConnectionConfig;
pub use error::{RpcError, ServerError};
pub use jsonrpc::{Credentials, JsonRpcClient};

use serde::Deserialize;
use serde_json::{Map, Value};

/// Server version information, as returned by `common.version`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerVersion {
    #[serde(default)]
    pub server_version: String,
    /// `[major, minor, micro, release_level, serial, ...]`; `major` may be a
    /// string like `"saas~17"` on SaaS builds.
    #[serde(default)]
    pub server_version_info: Vec<Value>,
    #[serde(default)]
    pub protocol_version: Option<i64>,
}

impl ServerVersion {
    /// Major version number, or 0 when the server did not report a usable one.
    pub fn major(&self) -> u32 {
        match self.server_version_info.first() {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            Some(Value::String(s)) => leading_number(s),
            _ => leading_number(&self.server_version),
        }
    }
}

/// First run of digits in a version label (`"saas~17.2"` -> 17).
fn leading_number(label: &str) -> u32 {
    label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

/// Remote call capability consumed by the dictionary-view engine.
///
/// Implementations perform a single blocking round trip per call; no
/// retries.
pub trait Transport: Send + Sync {
    /// Call `method` on `model` with positional `args` and keyword `kwargs`.
    fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, RpcError>;

    /// Server version information.
    fn version(&self) -> Result<ServerVersion, RpcError>;

    /// Major server version, used to pick version-dependent call shapes.
    fn server_major_version(&self) -> Result<u32, RpcError> {
        Ok(self.version()?.major())
    }
}
