//! JSON-RPC client for Odoo servers.
//!
//! Every call is a `POST <url>/jsonrpc` carrying
//! `{"jsonrpc": "2.0", "method": "call", "params": {"service", "method", "args"}}`.
//! Model methods go through `object.execute_kw` with the session credentials.
//!
//! ```ignore
//! let client = JsonRpcClient::new("https://erp.example.com")
//!     .with_credentials(Credentials::new("prod", 2, "api-key"));
//! let dbs = client.list_databases()?;
//! let partners = client.execute_kw("res.partner", "search_read", vec![json!([])], kwargs)?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::{RpcError, ServerError};
use crate::{ServerVersion, Transport};

/// Credentials of an already established session.
#[derive(Clone)]
pub struct Credentials {
    pub database: String,
    pub uid: i64,
    pub password: String,
}

impl Credentials {
    pub fn new(database: &str, uid: i64, password: &str) -> Self {
        Self {
            database: database.to_string(),
            uid,
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("database", &self.database)
            .field("uid", &self.uid)
            .field("password", &"***")
            .finish()
    }
}

/// Blocking JSON-RPC client.
pub struct JsonRpcClient {
    url: String,
    endpoint: String,
    agent: ureq::Agent,
    credentials: Option<Credentials>,
    version: RwLock<Option<ServerVersion>>,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds.
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    /// Create a client for the server at `url` with default timeouts.
    pub fn new(url: &str) -> Self {
        Self::with_timeouts(
            url,
            Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            Duration::from_secs(Self::DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Create a client with explicit timeouts.
    pub fn with_timeouts(url: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        let url = url.trim_end_matches('/').to_string();
        let client = Self {
            endpoint: format!("{url}/jsonrpc"),
            url,
            agent: Self::build_agent(timeout, connect_timeout),
            credentials: None,
            version: RwLock::new(None),
            next_id: AtomicU64::new(1),
        };
        info!(url = %client.url, "Odoo JSON-RPC client initialized");
        client
    }

    /// Create a client from a [`ConnectionConfig`].
    pub fn from_config(config: &ConnectionConfig) -> Self {
        let client = Self::with_timeouts(&config.url, config.timeout, config.connect_timeout);
        match config.credentials() {
            Some(credentials) => client.with_credentials(credentials),
            None => client,
        }
    }

    /// Attach session credentials used by `execute_kw`.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Call `service.method(*args)`.
    pub fn call(&self, service: &str, method: &str, args: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = request_body(id, service, method, args);

        let reply: Value = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| RpcError::Transport {
                url: self.endpoint.clone(),
                message: e.to_string(),
            })?
            .into_json()
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        decode_reply(reply)
    }

    /// List the databases (may be disabled on the server and fail).
    pub fn list_databases(&self) -> Result<Vec<String>, RpcError> {
        let value = self.call("db", "list", Vec::new())?;
        serde_json::from_value(value).map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }
}

impl Transport for JsonRpcClient {
    fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, RpcError> {
        let credentials = self.credentials.as_ref().ok_or(RpcError::NotAuthenticated)?;
        debug!(model, method, "execute_kw");
        self.call(
            "object",
            "execute_kw",
            vec![
                Value::String(credentials.database.clone()),
                Value::from(credentials.uid),
                Value::String(credentials.password.clone()),
                Value::String(model.to_string()),
                Value::String(method.to_string()),
                Value::Array(args),
                Value::Object(kwargs),
            ],
        )
    }

    fn version(&self) -> Result<ServerVersion, RpcError> {
        if let Some(version) = self.version.read().as_ref() {
            return Ok(version.clone());
        }
        let value = self.call("common", "version", Vec::new())?;
        let version: ServerVersion =
            serde_json::from_value(value).map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
        *self.version.write() = Some(version.clone());
        Ok(version)
    }
}

fn request_body(id: u64, service: &str, method: &str, args: Vec<Value>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "call",
        "params": {"service": service, "method": method, "args": args},
        "id": id,
    })
}

/// Extract the `result` of a reply, or its `error` as a [`ServerError`].
fn decode_reply(reply: Value) -> Result<Value, RpcError> {
    let Value::Object(mut reply) = reply else {
        return Err(RpcError::InvalidResponse(format!(
            "expected an object, got {reply}"
        )));
    };
    match reply.remove("error") {
        Some(error) if !error.is_null() => Err(ServerError::from_value(&error).into()),
        _ => Ok(reply.remove("result").unwrap_or(Value::Null)),
    }
}
