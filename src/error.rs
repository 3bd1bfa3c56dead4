//! Error type of the dictionary-view engine.

use odoo_transport::RpcError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The caller passed something unusable (malformed field selection,
    /// empty group-by, invalid xml id).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The server answered with a shape this engine cannot interpret.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Any failure of the remote call itself, passed through untouched.
    #[error(transparent)]
    Remote(#[from] RpcError),

    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(message.into())
    }
}
