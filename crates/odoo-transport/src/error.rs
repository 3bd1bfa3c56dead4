//! Transport-level errors.

use serde_json::Value;
use thiserror::Error;

/// Failure of a single remote call.
///
/// The dictionary-view engine never interprets these; they are passed to the
/// caller unchanged.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The HTTP exchange itself failed (connection, TLS, non-2xx status).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with something that is not a JSON-RPC reply.
    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    /// The server reported an error (exception raised on the remote side).
    #[error(transparent)]
    Server(#[from] ServerError),

    /// `execute_kw` was attempted without session credentials.
    #[error("you must authenticate first")]
    NotAuthenticated,
}

/// Error object returned in the `error` member of a JSON-RPC reply.
///
/// ```json
/// {"code": 200, "message": "Odoo Server Error",
///  "data": {"name": "odoo.exceptions.AccessError", "debug": "Traceback ..."}}
/// ```
#[derive(Debug, Clone, Error)]
#[error("server error {code}: {message}")]
pub struct ServerError {
    pub code: i64,
    pub message: String,
    /// The raw `data` member, if any.
    pub data: Option<Value>,
}

impl ServerError {
    /// Build from the `error` member of a reply. Unknown shapes are kept as
    /// the message so nothing the server said is lost.
    pub fn from_value(error: &Value) -> Self {
        match error {
            Value::Object(obj) => Self {
                code: obj.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: obj
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
                data: obj.get("data").filter(|d| !d.is_null()).cloned(),
            },
            Value::String(message) => Self {
                code: 0,
                message: message.clone(),
                data: None,
            },
            other => Self {
                code: 0,
                message: other.to_string(),
                data: None,
            },
        }
    }

    /// The debug trace received from the remote server.
    pub fn remote_trace(&self) -> Option<&str> {
        self.data.as_ref()?.get("debug")?.as_str()
    }

    /// Qualified name of the remote exception class.
    pub fn exception_name(&self) -> Option<&str> {
        self.data.as_ref()?.get("name")?.as_str()
    }
}
