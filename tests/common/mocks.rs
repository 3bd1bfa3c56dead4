//! In-memory Odoo server.
//!
//! [`MockTransport`] answers `fields_get`, `read`, `search_read` and
//! `read_group` from fixture tables and records every call so tests can
//! assert on how many round trips were made and with which arguments.

use std::collections::HashMap;

use odoo_connect::odoo_transport::{RpcError, ServerError, ServerVersion, Transport};
use odoo_connect::{Domain, Record};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

/// One recorded `execute_kw` call.
#[derive(Debug, Clone)]
pub struct Call {
    pub model: String,
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

#[derive(Default)]
struct Table {
    fields: Map<String, Value>,
    rows: Vec<Record>,
    groups: Vec<Record>,
}

pub struct MockTransport {
    major: u32,
    tables: Mutex<HashMap<String, Table>>,
    failures: Mutex<HashMap<(String, String), ServerError>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new(major: u32) -> Self {
        Self {
            major,
            tables: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register `model` with its `fields_get` answer and stored rows (raw
    /// form: many2one as bare ids).
    pub fn with_model(self, model: &str, fields: Value, rows: Value) -> Self {
        {
            let mut tables = self.tables.lock();
            let table = tables.entry(model.to_string()).or_default();
            table.fields = object(fields);
            table.rows = records(rows);
        }
        self
    }

    /// Canned `read_group` answer for `model`.
    pub fn with_groups(self, model: &str, rows: Value) -> Self {
        self.tables
            .lock()
            .entry(model.to_string())
            .or_default()
            .groups = records(rows);
        self
    }

    /// Make `model.method` fail with a server error.
    pub fn failing(self, model: &str, method: &str, message: &str) -> Self {
        self.failures.lock().insert(
            (model.to_string(), method.to_string()),
            ServerError {
                code: 200,
                message: message.to_string(),
                data: Some(json!({"name": "odoo.exceptions.AccessError", "debug": "Traceback"})),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls of `method`, in order.
    pub fn calls_to(&self, method: &str) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn fields_get(&self, model: &str, kwargs: &Map<String, Value>) -> Result<Value, RpcError> {
        let tables = self.tables.lock();
        let table = tables.get(model).ok_or_else(|| unknown_model(model))?;
        let attributes: Vec<&str> = kwargs
            .get("attributes")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if attributes.is_empty() {
            return Ok(Value::Object(table.fields.clone()));
        }
        let projected = table
            .fields
            .iter()
            .map(|(name, descriptor)| {
                let kept: Map<String, Value> = descriptor
                    .as_object()
                    .into_iter()
                    .flatten()
                    .filter(|(k, _)| attributes.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (name.clone(), Value::Object(kept))
            })
            .collect();
        Ok(Value::Object(projected))
    }

    fn read(
        &self,
        model: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Result<Value, RpcError> {
        let tables = self.tables.lock();
        let table = tables.get(model).ok_or_else(|| unknown_model(model))?;
        let ids: Vec<i64> = args
            .first()
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        let fields = string_list(args.get(1));
        let raw = kwargs.get("load").and_then(Value::as_str) == Some("raw");

        let rows = ids
            .iter()
            .filter_map(|id| table.rows.iter().find(|r| r["id"] == json!(id)))
            .map(|row| Value::Object(render(&tables, table, row, &fields, raw)))
            .collect();
        Ok(Value::Array(rows))
    }

    fn search_read(
        &self,
        model: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Result<Value, RpcError> {
        if self.major < 15 && kwargs.contains_key("load") {
            return Err(server_error(&format!(
                "search_read() got an unexpected keyword argument 'load' ({model})"
            )));
        }
        let tables = self.tables.lock();
        let table = tables.get(model).ok_or_else(|| unknown_model(model))?;
        let domain = args.first().map(Domain::from_value).unwrap_or_default();
        let fields = string_list(args.get(1));
        let raw = kwargs.get("load").and_then(Value::as_str) == Some("raw");
        let offset = kwargs.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize;
        let limit = kwargs
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(usize::MAX, |l| l as usize);

        let rows = table
            .rows
            .iter()
            .filter(|row| matches(&domain, row))
            .skip(offset)
            .take(limit)
            .map(|row| Value::Object(render(&tables, table, row, &fields, raw)))
            .collect();
        Ok(Value::Array(rows))
    }
}

impl Transport for MockTransport {
    fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, RpcError> {
        self.calls.lock().push(Call {
            model: model.to_string(),
            method: method.to_string(),
            args: args.clone(),
            kwargs: kwargs.clone(),
        });
        if let Some(err) = self
            .failures
            .lock()
            .get(&(model.to_string(), method.to_string()))
        {
            return Err(RpcError::Server(err.clone()));
        }

        match method {
            "fields_get" => self.fields_get(model, &kwargs),
            "read" => self.read(model, &args, &kwargs),
            "search_read" => self.search_read(model, &args, &kwargs),
            "read_group" => {
                let tables = self.tables.lock();
                let table = tables.get(model).ok_or_else(|| unknown_model(model))?;
                Ok(Value::Array(
                    table.groups.iter().cloned().map(Value::Object).collect(),
                ))
            }
            other => Err(server_error(&format!("{model}.{other} is not mocked"))),
        }
    }

    fn version(&self) -> Result<ServerVersion, RpcError> {
        Ok(ServerVersion {
            server_version: format!("{}.0", self.major),
            server_version_info: vec![
                json!(self.major),
                json!(0),
                json!(0),
                json!("final"),
                json!(0),
            ],
            protocol_version: Some(1),
        })
    }
}

/// Project `row` on `fields` (all when empty, `id` always), rendering
/// many2one ids as `[id, name]` unless `raw`.
fn render(
    tables: &HashMap<String, Table>,
    table: &Table,
    row: &Record,
    fields: &[String],
    raw: bool,
) -> Record {
    row.iter()
        .filter(|(k, _)| k.as_str() == "id" || fields.is_empty() || fields.contains(*k))
        .map(|(k, v)| {
            let descriptor = table.fields.get(k);
            let many2one = descriptor.and_then(|d| d.get("type")) == Some(&json!("many2one"));
            let value = match (many2one && !raw, v.as_i64()) {
                (true, Some(id)) => {
                    let relation = descriptor
                        .and_then(|d| d.get("relation"))
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    let label = tables
                        .get(relation)
                        .and_then(|t| t.rows.iter().find(|r| r["id"] == json!(id)))
                        .and_then(|r| r.get("name"))
                        .cloned()
                        .unwrap_or_else(|| json!(""));
                    json!([id, label])
                }
                _ => v.clone(),
            };
            (k.clone(), value)
        })
        .collect()
}

/// `=`, `!=` and `in` clauses; anything else matches.
fn matches(domain: &Domain, row: &Record) -> bool {
    domain.clauses().all(|(field, operator, value)| {
        let actual = row.get(field).unwrap_or(&Value::Null);
        match operator {
            "=" => actual == value,
            "!=" => actual != value,
            "in" => value.as_array().is_some_and(|v| v.contains(actual)),
            _ => true,
        }
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn server_error(message: &str) -> RpcError {
    RpcError::Server(ServerError {
        code: 200,
        message: message.to_string(),
        data: None,
    })
}

fn unknown_model(model: &str) -> RpcError {
    server_error(&format!("KeyError: '{model}'"))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Fixture rows from a JSON array of objects.
pub fn records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items.into_iter().map(object).collect(),
        other => panic!("expected a JSON array, got {other}"),
    }
}
