//! Client: transport, shared context and the per-model metadata registry.

use std::collections::HashMap;
use std::sync::Arc;

use odoo_transport::{ServerVersion, Transport};
use odoo_types::{as_id, Domain, Record};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::expand::RelationReader;
use crate::metadata::{FieldCache, FieldMap};
use crate::model::{Model, SearchOptions};

/// Entry point for record access.
///
/// Cheap to clone; clones share the transport, the context and the field
/// metadata of every model already looked up.
///
/// ```ignore
/// use odoo_connect::Client;
/// use odoo_transport::{ConnectionConfig, JsonRpcClient};
///
/// let client = Client::new(JsonRpcClient::from_config(&ConnectionConfig::from_env()?));
/// let orders = client
///     .model("sale.order")
///     .search_read_dict(&Domain::new(), ["name", "partner_id.name"], Default::default())?;
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    /// Field metadata per model name.
    models: RwLock<HashMap<String, Arc<FieldCache>>>,
    /// Sent as the `context` keyword of every call that has none.
    context: RwLock<Map<String, Value>>,
}

impl Client {
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self::from_transport(Arc::new(transport))
    }

    pub fn from_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                models: RwLock::new(HashMap::new()),
                context: RwLock::new(Map::new()),
            }),
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    /// Handle on `name`. Handles of the same model share field metadata.
    pub fn model(&self, name: &str) -> Model {
        Model::new(self.clone(), name, self.field_cache(name))
    }

    /// Like [`model`](Self::model), but checks the model exists by loading
    /// its fields.
    pub fn model_checked(&self, name: &str) -> Result<Model> {
        let model = self.model(name);
        model
            .fields(false)
            .map_err(|e| Error::NotFound(format!("model {name} ({e})")))?;
        Ok(model)
    }

    fn field_cache(&self, name: &str) -> Arc<FieldCache> {
        if let Some(cache) = self.inner.models.read().get(name) {
            return Arc::clone(cache);
        }
        let mut models = self.inner.models.write();
        Arc::clone(models.entry(name.to_string()).or_default())
    }

    // ==================== Context ====================

    pub fn context(&self) -> Map<String, Value> {
        self.inner.context.read().clone()
    }

    pub fn set_context(&self, context: Map<String, Value>) {
        *self.inner.context.write() = context;
    }

    /// Set one context key, e.g. `("lang", "fr_FR")`.
    pub fn update_context(&self, key: &str, value: impl Into<Value>) {
        self.inner
            .context
            .write()
            .insert(key.to_string(), value.into());
    }

    // ==================== Server ====================

    pub fn version(&self) -> Result<ServerVersion> {
        Ok(self.inner.transport.version()?)
    }

    pub fn major_version(&self) -> Result<u32> {
        Ok(self.inner.transport.server_major_version()?)
    }

    /// Run `method` on `model`, adding the client context when the call does
    /// not carry one.
    pub(crate) fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        mut kwargs: Map<String, Value>,
    ) -> Result<Value> {
        if !kwargs.contains_key("context") {
            let context = self.inner.context.read();
            if !context.is_empty() {
                kwargs.insert("context".to_string(), Value::Object(context.clone()));
            }
        }
        debug!(model, method, "execute");
        Ok(self
            .inner
            .transport
            .execute_kw(model, method, args, kwargs)?)
    }

    /// Names of every model known to the server.
    pub fn list_models(&self) -> Result<Vec<String>> {
        let rows = self.model("ir.model").search_read(
            &Domain::new(),
            &["model"],
            SearchOptions::default(),
        )?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get("model").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Read the record behind an external id such as `"base.main_company"`.
    ///
    /// An empty `fields` reads every field. `Ok(None)` when no such external
    /// id exists or its record was deleted.
    pub fn find_ref(&self, xml_id: &str, fields: &[&str]) -> Result<Option<Record>> {
        let (module, name) = xml_id
            .split_once('.')
            .ok_or_else(|| Error::configuration(format!("xml id not valid: {xml_id}")))?;
        let domain = Domain::new()
            .clause("module", "=", module)
            .clause("name", "=", name);
        let rows = self.model("ir.model.data").search_read(
            &domain,
            &["id", "model", "res_id"],
            SearchOptions::default().limit(1),
        )?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let model = row
            .get("model")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::protocol(format!("ir.model.data row without model: {xml_id}")))?;
        let res_id = row
            .get("res_id")
            .and_then(as_id)
            .ok_or_else(|| Error::protocol(format!("ir.model.data row without res_id: {xml_id}")))?;
        let records = self.model(model).read(&[res_id], fields)?;
        Ok(records.into_iter().next())
    }

    /// Like [`find_ref`](Self::find_ref), failing with [`Error::NotFound`]
    /// when nothing matches.
    pub fn get_ref(&self, xml_id: &str, fields: &[&str]) -> Result<Record> {
        self.find_ref(xml_id, fields)?.ok_or_else(|| {
            Error::NotFound(format!(
                "no record found for unique ID {xml_id}, it may have been deleted"
            ))
        })
    }
}

impl RelationReader for Client {
    fn fields(&self, model: &str) -> Result<Arc<FieldMap>> {
        self.model(model).fields(false)
    }

    fn read(&self, model: &str, ids: &[i64], fields: &[&str]) -> Result<Vec<Record>> {
        self.model(model).read_raw(ids, fields)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("models", &self.inner.models.read().len())
            .field("context", &*self.inner.context.read())
            .finish()
    }
}
