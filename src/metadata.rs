//! Per-model field metadata.
//!
//! Descriptors come from `fields_get` and drive the relation expander: the
//! `relation` attribute says whether a field points at another model and the
//! `type` says whether it holds one id or many. They are fetched once per
//! model and kept for the lifetime of the [`Client`](crate::Client).

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Attributes requested for the default (non-extended) projection.
pub const BASIC_ATTRIBUTES: [&str; 6] = [
    "string", "type", "readonly", "required", "store", "relation",
];

/// Descriptors of every field of a model, by field name.
pub type FieldMap = BTreeMap<String, FieldDescriptor>;

/// Metadata of one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type", default)]
    pub field_type: String,
    /// Target model, present for relation fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    /// Human label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
    /// Everything else the server reported (extended mode).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How many related records a relation field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// `many2one`: one id (or unset).
    Single,
    /// `one2many` / `many2many`: a list of ids.
    Multi,
}

impl FieldDescriptor {
    /// `Some` for relation fields, `None` for scalars.
    pub fn cardinality(&self) -> Option<Cardinality> {
        self.relation.as_ref()?;
        if self.field_type == "many2one" {
            Some(Cardinality::Single)
        } else {
            Some(Cardinality::Multi)
        }
    }

    pub fn is_relation(&self) -> bool {
        self.relation.is_some()
    }
}

struct CachedFields {
    fields: Arc<FieldMap>,
    extended: bool,
}

/// Lazily filled, widen-only cache of a model's field descriptors.
#[derive(Default)]
pub struct FieldCache {
    state: RwLock<Option<CachedFields>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached descriptors, calling `fetch` with the attribute list
    /// to request when the cache is empty or an extended view is requested
    /// and only the basic projection is cached. An empty attribute list means
    /// "all attributes".
    pub fn get_or_fetch<F>(&self, extended: bool, fetch: F) -> Result<Arc<FieldMap>>
    where
        F: FnOnce(&[&str]) -> Result<Value>,
    {
        if let Some(cached) = self.state.read().as_ref() {
            if cached.extended || !extended {
                return Ok(Arc::clone(&cached.fields));
            }
        }

        let attributes: &[&str] = if extended { &[] } else { &BASIC_ATTRIBUTES };
        let raw = fetch(attributes)?;
        let fields: FieldMap = serde_json::from_value(raw)
            .map_err(|e| Error::protocol(format!("invalid fields_get response: {e}")))?;
        let fields = Arc::new(fields);

        let mut state = self.state.write();
        // Another caller may have widened the cache in the meantime.
        if let Some(cached) = state.as_ref() {
            if cached.extended && !extended {
                return Ok(Arc::clone(&cached.fields));
            }
        }
        *state = Some(CachedFields {
            fields: Arc::clone(&fields),
            extended,
        });
        Ok(fields)
    }

    /// Whether the cache holds the extended attribute set.
    pub fn is_extended(&self) -> bool {
        self.state.read().as_ref().is_some_and(|c| c.extended)
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read().is_some()
    }
}
