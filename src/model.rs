//! Record-set access on one model.
//!
//! [`Model`] offers the flat primitives (`read`, `search_read`,
//! `read_group`, `fields_get`, or any method through [`Model::execute`]) and
//! the dictionary views built on them:
//!
//! - [`Model::read_dict`] / [`Model::read_dict_one`]: by id
//! - [`Model::search_read_dict`]: by domain
//! - [`Model::read_group_dict`]: grouped aggregates with canonical date buckets
//!
//! Dictionary views accept dotted paths or nested selections and return
//! records whose relation fields are replaced by nested records.

use std::sync::Arc;

use odoo_types::{as_id, Domain, Record};
use serde_json::{Map, Value};

use crate::client::Client;
use crate::dates::{canonicalize_rows, DateBucket, WindowSource};
use crate::error::{Error, Result};
use crate::expand::expand_records;
use crate::fields::{FieldSpec, IntoFieldSpec};
use crate::metadata::{FieldCache, FieldMap};

/// Paging, ordering and extra keyword arguments for searches.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Sort specification, e.g. `"date desc, id"`.
    pub order: Option<String>,
    /// Any other keyword argument passed through as-is.
    pub extra: Map<String, Value>,
}

impl SearchOptions {
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn order(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    #[must_use]
    pub fn arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Keyword arguments; `order_key` is `"order"` for searches and
    /// `"orderby"` for `read_group`.
    fn into_kwargs(self, order_key: &str) -> Map<String, Value> {
        let mut kwargs = self.extra;
        if let Some(limit) = self.limit {
            kwargs.insert("limit".to_string(), Value::from(limit));
        }
        if let Some(offset) = self.offset {
            kwargs.insert("offset".to_string(), Value::from(offset));
        }
        if let Some(order) = self.order {
            kwargs.insert(order_key.to_string(), Value::String(order));
        }
        kwargs
    }
}

/// Handle on one model of a [`Client`].
#[derive(Clone)]
pub struct Model {
    client: Client,
    name: String,
    fields: Arc<FieldCache>,
}

impl Model {
    pub(crate) fn new(client: Client, name: &str, fields: Arc<FieldCache>) -> Self {
        Self {
            client,
            name: name.to_string(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Call any method of the model.
    pub fn execute(
        &self,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value> {
        self.client.execute_kw(&self.name, method, args, kwargs)
    }

    // =========================================================================
    // Flat primitives
    // =========================================================================

    /// Raw `fields_get`; an empty `attributes` list returns every attribute.
    pub fn fields_get(&self, attributes: &[&str]) -> Result<Value> {
        let mut kwargs = Map::new();
        kwargs.insert("allfields".to_string(), Value::Array(Vec::new()));
        kwargs.insert("attributes".to_string(), string_list(attributes));
        self.execute("fields_get", Vec::new(), kwargs)
    }

    /// Cached field descriptors; `extended` asks for every attribute.
    pub fn fields(&self, extended: bool) -> Result<Arc<FieldMap>> {
        self.fields
            .get_or_fetch(extended, |attributes| self.fields_get(attributes))
    }

    /// `read` with the server's default rendering (`[id, name]` pairs for
    /// many2one fields). An empty `fields` reads every field.
    pub fn read(&self, ids: &[i64], fields: &[&str]) -> Result<Vec<Record>> {
        self.read_with(ids, fields, Map::new())
    }

    /// `read` with `load="raw"`: many2one fields come back as bare ids.
    pub fn read_raw(&self, ids: &[i64], fields: &[&str]) -> Result<Vec<Record>> {
        let mut kwargs = Map::new();
        kwargs.insert("load".to_string(), Value::from("raw"));
        self.read_with(ids, fields, kwargs)
    }

    fn read_with(
        &self,
        ids: &[i64],
        fields: &[&str],
        kwargs: Map<String, Value>,
    ) -> Result<Vec<Record>> {
        let value = self.execute(
            "read",
            vec![Value::from(ids.to_vec()), string_list(fields)],
            kwargs,
        )?;
        self.records(value, "read")
    }

    pub fn search_read(
        &self,
        domain: &Domain,
        fields: &[&str],
        options: SearchOptions,
    ) -> Result<Vec<Record>> {
        let value = self.execute(
            "search_read",
            vec![domain.to_value(), string_list(fields)],
            options.into_kwargs("order"),
        )?;
        self.records(value, "search_read")
    }

    /// `search_read` with many2one fields as bare ids.
    ///
    /// Servers before 15 do not accept `load`; their `[id, name]` pairs are
    /// flattened client side instead.
    pub fn search_read_raw(
        &self,
        domain: &Domain,
        fields: &[&str],
        options: SearchOptions,
    ) -> Result<Vec<Record>> {
        if self.client.major_version()? >= 15 {
            return self.search_read(domain, fields, options.arg("load", "raw"));
        }
        let mut rows = self.search_read(domain, fields, options)?;
        for row in rows.iter_mut() {
            for value in row.values_mut() {
                if let Some(id) = rendered_pair_id(value) {
                    *value = Value::from(id);
                }
            }
        }
        Ok(rows)
    }

    /// Flat `read_group`, always with `lazy=false` so every group-by field
    /// is applied at once.
    pub fn read_group(
        &self,
        domain: &Domain,
        aggregates: &[&str],
        groupby: &[&str],
        options: SearchOptions,
    ) -> Result<Vec<Record>> {
        let value = self.execute(
            "read_group",
            vec![domain.to_value(), string_list(aggregates), string_list(groupby)],
            options.arg("lazy", false).into_kwargs("orderby"),
        )?;
        self.records(value, "read_group")
    }

    // =========================================================================
    // Dictionary views
    // =========================================================================

    /// Expand the relation fields of records of this model per `spec`.
    pub fn expand(&self, records: Vec<Record>, spec: &FieldSpec) -> Result<Vec<Record>> {
        expand_records(&self.client, &self.name, records, spec)
    }

    /// Read `ids` as nested records.
    ///
    /// ```ignore
    /// let orders = model.read_dict(&[1, 2], ["name", "partner_id.name"])?;
    /// // [{"id": 1, "name": "SO001", "partner_id": {"id": 5, "name": "Acme"}}, ...]
    /// ```
    pub fn read_dict(&self, ids: &[i64], fields: impl IntoFieldSpec) -> Result<Vec<Record>> {
        let spec = fields.into_field_spec()?;
        let names: Vec<&str> = spec.names().collect();
        let rows = self.read_raw(ids, &names)?;
        self.expand(rows, &spec)
    }

    /// Read one record as a nested record; `None` if it does not exist.
    pub fn read_dict_one(&self, id: i64, fields: impl IntoFieldSpec) -> Result<Option<Record>> {
        Ok(self.read_dict(&[id], fields)?.into_iter().next())
    }

    /// Search and read matching records as nested records.
    pub fn search_read_dict(
        &self,
        domain: &Domain,
        fields: impl IntoFieldSpec,
        options: SearchOptions,
    ) -> Result<Vec<Record>> {
        let spec = fields.into_field_spec()?;
        let names: Vec<&str> = spec.names().collect();
        let rows = self.search_read_raw(domain, &names, options)?;
        self.expand(rows, &spec)
    }

    /// Grouped read with nested group-by values.
    ///
    /// `groupby` accepts dotted paths: `["date:month", "partner_id.name"]`
    /// groups by month and partner and expands each partner's name. Date
    /// buckets are canonicalized (see [`crate::dates`]). `aggregates`
    /// defaults to `["id"]` when absent or empty.
    pub fn read_group_dict(
        &self,
        domain: &Domain,
        aggregates: Option<&[&str]>,
        groupby: impl IntoFieldSpec,
        options: SearchOptions,
    ) -> Result<Vec<Record>> {
        let spec = groupby.into_field_spec()?;
        if spec.is_empty() {
            return Err(Error::configuration("missing groupby values"));
        }
        let groupby: Vec<&str> = spec.names().collect();
        let aggregates: &[&str] = match aggregates {
            Some(aggregates) if !aggregates.is_empty() => aggregates,
            _ => &["id"],
        };
        let mut rows = self.read_group(domain, aggregates, &groupby, options)?;

        // The server version only matters for date buckets.
        if groupby.iter().any(|g| DateBucket::split_field(g).is_some()) {
            let source = WindowSource::for_major_version(self.client.major_version()?);
            canonicalize_rows(&mut rows, &groupby, source);
        }
        self.expand(rows, &spec)
    }

    fn records(&self, value: Value, method: &str) -> Result<Vec<Record>> {
        let Value::Array(items) = value else {
            return Err(Error::protocol(format!(
                "{}.{method} returned {value} instead of a list",
                self.name
            )));
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => Err(Error::protocol(format!(
                    "{}.{method} returned a non-record element: {other}",
                    self.name
                ))),
            })
            .collect()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("name", &self.name).finish()
    }
}

fn string_list(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|s| Value::from(*s)).collect())
}

/// The id of an `[id, "name"]` pair as rendered by servers without `load`.
fn rendered_pair_id(value: &Value) -> Option<i64> {
    match value.as_array()?.as_slice() {
        [id, Value::String(_)] => as_id(id),
        _ => None,
    }
}
