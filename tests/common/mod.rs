#![allow(unused_imports)]
#![allow(dead_code)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `mocks`: in-memory [`MockTransport`] recording every call
//! - `fixtures`: a small sales database served by the mock
//! - `assertions`: assertion helpers with readable failure messages

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use assertions::{assert_error_contains, assert_ok, assert_records_eq};
pub use fixtures::{client_for, sales_transport};
pub use mocks::{records, Call, MockTransport};
