//! Shared types for the odoo-connect workspace.
//!
//! This crate holds the value-level vocabulary used by both the transport and
//! the dictionary-view engine, so neither has to depend on the other for it:
//!
//! - [`record`]: the [`Record`] alias plus truthiness and id helpers
//! - [`domain`]: the [`Domain`] search expression
//! - [`env_utils`]: environment-variable parsing used by connection config

pub mod domain;
pub mod env_utils;
pub mod record;

pub use domain::{Domain, DomainTerm, LogicalOp};
pub use record::{as_id, is_truthy, record_id, Record};
