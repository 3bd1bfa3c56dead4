//! Odoo Connect
//!
//! Nested ("dictionary view") record access on top of Odoo's flat RPC
//! primitives:
//!
//! - **Field selections**: dotted paths or nested mappings, see [`fields`]
//! - **Relation expansion**: one batched read per relation and level, see [`Model::read_dict`]
//! - **Grouped reads**: canonical date-bucket labels, see [`dates`]
//! - **Metadata caching**: `fields_get` once per model, see [`metadata`]
//!
//! # Example
//!
//! ```ignore
//! use odoo_connect::{Client, Domain, SearchOptions};
//! use odoo_transport::{ConnectionConfig, JsonRpcClient};
//!
//! let client = Client::new(JsonRpcClient::from_config(&ConnectionConfig::from_env()?));
//! let orders = client.model("sale.order").search_read_dict(
//!     &Domain::new().clause("state", "=", "sale"),
//!     ["name", "partner_id.name", "order_line.product_id.default_code"],
//!     SearchOptions::default().limit(10),
//! )?;
//! ```

pub mod client;
pub mod dates;
pub mod error;
mod expand;
pub mod fields;
pub mod metadata;
pub mod model;

pub use client::Client;
pub use dates::{canonicalize_rows, DateBucket, DateWindow, WindowSource};
pub use error::{Error, Result};
pub use fields::{FieldSpec, IntoFieldSpec};
pub use metadata::{Cardinality, FieldDescriptor, FieldMap};
pub use model::{Model, SearchOptions};

pub use odoo_transport;
pub use odoo_types::{Domain, DomainTerm, LogicalOp, Record};
