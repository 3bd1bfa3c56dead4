//! Environment variable parsing utilities.
//!
//! Connection settings are read from `ODOO_*` variables. These helpers keep
//! the "parse or fall back" boilerplate in one place:
//!
//! ```
//! use odoo_types::env_utils::{env_var_or, env_string};
//!
//! let timeout: u64 = env_var_or("ODOO_TIMEOUT_SECS", 30);
//! let database: Option<String> = env_string("ODOO_DATABASE");
//! ```

use std::str::FromStr;
use std::time::Duration;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Read a string variable, treating blank values as unset.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a duration expressed in whole seconds, with a default.
pub fn env_secs_or(key: &str, default_secs: u64) -> Duration {
    Duration::from_secs(env_var_or(key, default_secs))
}
