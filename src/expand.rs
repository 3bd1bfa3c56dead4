//! Relation expansion.
//!
//! Turns flat records into nested trees following a [`FieldSpec`]. For each
//! relation field in the selection, the ids referenced by the whole batch are
//! collected, fetched from the related model in one read, expanded
//! recursively with the field's sub-selection, and substituted back:
//!
//! ```text
//! [{"id": 1, "partner_id": [5, "Acme"]}, {"id": 2, "partner_id": false}]
//!     + {"partner_id": {"name": {}}}
//!     -> read res.partner [5] ["name"]
//! [{"id": 1, "partner_id": {"id": 5, "name": "Acme"}}, {"id": 2, "partner_id": {}}]
//! ```
//!
//! Recursion always descends into a strictly smaller sub-selection, so
//! relation cycles between models (partner -> company -> partner) terminate.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use odoo_types::{as_id, is_truthy, record_id, Record};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fields::FieldSpec;
use crate::metadata::{Cardinality, FieldMap};

/// What the expander needs from the outside world.
pub(crate) trait RelationReader {
    /// Field descriptors of `model`.
    fn fields(&self, model: &str) -> Result<Arc<FieldMap>>;

    /// Flat read of `ids` on `model`, relations as bare ids.
    fn read(&self, model: &str, ids: &[i64], fields: &[&str]) -> Result<Vec<Record>>;
}

/// Expand the relation fields of `records` (all of `model`) per `spec`.
///
/// An empty `spec` selects every field of the model without descending into
/// any relation.
pub(crate) fn expand_records<R>(
    reader: &R,
    model: &str,
    mut records: Vec<Record>,
    spec: &FieldSpec,
) -> Result<Vec<Record>>
where
    R: RelationReader + ?Sized,
{
    let fields = reader.fields(model)?;
    let all_fields;
    let spec = if spec.is_empty() {
        all_fields = FieldSpec::from_paths(fields.keys())?;
        &all_fields
    } else {
        spec
    };

    for (name, sub) in spec.iter() {
        let Some(descriptor) = fields.get(name) else {
            continue;
        };
        let (Some(relation), Some(cardinality)) =
            (descriptor.relation.as_deref(), descriptor.cardinality())
        else {
            continue;
        };

        let ids = match cardinality {
            Cardinality::Single => collect_single(&mut records, model, name)?,
            Cardinality::Multi => collect_multi(&mut records, model, name)?,
        };
        if sub.is_empty() {
            continue;
        }

        let resolved = if ids.is_empty() || !sub.requests_beyond_id() {
            HashMap::new()
        } else {
            let ids: Vec<i64> = ids.into_iter().collect();
            let names: Vec<&str> = sub.names().collect();
            debug!(
                model,
                field = name,
                relation,
                count = ids.len(),
                "reading related records"
            );
            let children = reader.read(relation, &ids, &names)?;
            let children = expand_records(reader, relation, children, sub)?;
            children
                .into_iter()
                .filter_map(|child| record_id(&child).map(|id| (id, child)))
                .collect()
        };

        for record in records.iter_mut() {
            let nested = match cardinality {
                Cardinality::Single => {
                    let target = record.get(name).and_then(as_id).filter(|id| *id > 0);
                    Value::Object(match target {
                        Some(id) => lookup(&resolved, id),
                        None => Record::new(),
                    })
                }
                Cardinality::Multi => {
                    let targets = record.get(name).and_then(Value::as_array);
                    Value::Array(
                        targets
                            .into_iter()
                            .flatten()
                            .filter_map(as_id)
                            .map(|id| Value::Object(lookup(&resolved, id)))
                            .collect(),
                    )
                }
            };
            record.insert(name.to_string(), nested);
        }
    }
    Ok(records)
}

/// The resolved record for `id`, or a bare `{"id": id}` when the related
/// read did not return it.
fn lookup(resolved: &HashMap<i64, Record>, id: i64) -> Record {
    resolved.get(&id).cloned().unwrap_or_else(|| {
        let mut bare = Record::new();
        bare.insert("id".to_string(), Value::from(id));
        bare
    })
}

/// Normalize single-relation values to bare ids and collect them.
///
/// Accepts a positive id, an `[id, label]` pair, or a falsy value (unset).
fn collect_single(records: &mut [Record], model: &str, field: &str) -> Result<BTreeSet<i64>> {
    let mut ids = BTreeSet::new();
    for record in records.iter_mut() {
        let Some(value) = record.get(field) else {
            continue;
        };
        if !is_truthy(value) {
            continue;
        }
        let id = match value {
            Value::Number(_) => as_id(value),
            Value::Array(pair) if pair.len() == 2 && as_id(&pair[1]).is_none() => {
                as_id(&pair[0])
            }
            _ => None,
        };
        let Some(id) = id else {
            return Err(malformed(model, field, record, value));
        };
        record.insert(field.to_string(), Value::from(id));
        if id > 0 {
            ids.insert(id);
        }
    }
    Ok(ids)
}

/// Normalize multi-relation values to id lists and collect them.
///
/// Non-list values (missing, `false`) become `[]`.
fn collect_multi(records: &mut [Record], model: &str, field: &str) -> Result<BTreeSet<i64>> {
    let mut ids = BTreeSet::new();
    for record in records.iter_mut() {
        match record.get(field) {
            Some(Value::Array(items)) => {
                for item in items {
                    let id = as_id(item).ok_or_else(|| malformed(model, field, record, item))?;
                    ids.insert(id);
                }
            }
            _ => {
                record.insert(field.to_string(), Value::Array(Vec::new()));
            }
        }
    }
    Ok(ids)
}

fn malformed(model: &str, field: &str, record: &Record, value: &Value) -> Error {
    let id = record_id(record).map_or_else(|| "?".to_string(), |id| id.to_string());
    Error::protocol(format!(
        "unexpected value for relation {model}.{field} on record {id}: {value}"
    ))
}
