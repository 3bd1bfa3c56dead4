//! Field selection trees.
//!
//! Callers describe what to read either as dotted paths
//! (`["name", "partner_id.name", "partner_id.country_id.code"]`) or as an
//! already nested mapping (`{"name": {}, "partner_id": {"name": {}}}`). Both
//! normalize to a [`FieldSpec`]: an ordered tree where an empty sub-tree means
//! "read the value only" and a non-empty one means "follow the relation and
//! read these fields on the related records".

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Ordered, duplicate-free tree of field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    entries: Vec<(String, FieldSpec)>,
}

impl FieldSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from dotted paths. A field listed both alone and with children
    /// keeps its children.
    pub fn from_paths<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut spec = Self::new();
        for path in paths {
            spec.insert_path(path.as_ref())?;
        }
        Ok(spec)
    }

    /// Normalize a JSON selection: an array of dotted paths or a mapping whose
    /// values are path arrays, nested mappings or `null`.
    pub fn parse(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => Self::from_paths(path_strings(items)?),
            Value::Object(map) => Self::from_mapping(map),
            other => Err(Error::configuration(format!(
                "invalid fields parameter: {other}"
            ))),
        }
    }

    fn from_mapping(map: &Map<String, Value>) -> Result<Self> {
        let mut spec = Self::new();
        for (name, children) in map {
            let sub = match children {
                Value::Null => Self::new(),
                Value::Array(_) | Value::Object(_) => Self::parse(children)?,
                other => {
                    return Err(Error::configuration(format!(
                        "invalid selection for field {name}: {other}"
                    )))
                }
            };
            spec.child_mut(name).merge(sub);
        }
        Ok(spec)
    }

    /// Add one dotted path, extending existing branches.
    pub fn insert_path(&mut self, path: &str) -> Result<()> {
        if path.split('.').any(str::is_empty) {
            return Err(Error::configuration(format!("invalid field path: {path:?}")));
        }
        let mut level = self;
        for name in path.split('.') {
            level = level.child_mut(name);
        }
        Ok(())
    }

    /// Builder form: add `name` with the given sub-selection, merging with
    /// any existing entry.
    #[must_use]
    pub fn with(mut self, name: &str, sub: FieldSpec) -> Self {
        self.child_mut(name).merge(sub);
        self
    }

    /// Builder form: add a leaf field.
    #[must_use]
    pub fn field(self, name: &str) -> Self {
        self.with(name, FieldSpec::new())
    }

    fn child_mut(&mut self, name: &str) -> &mut FieldSpec {
        let pos = match self.entries.iter().position(|(n, _)| n == name) {
            Some(pos) => pos,
            None => {
                self.entries.push((name.to_string(), FieldSpec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    fn merge(&mut self, other: FieldSpec) {
        for (name, sub) in other.entries {
            self.child_mut(&name).merge(sub);
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, sub)| sub)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.entries.iter().map(|(n, sub)| (n.as_str(), sub))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level names as owned strings, in order (the server's field list).
    pub fn field_names(&self) -> Vec<String> {
        self.names().map(str::to_string).collect()
    }

    /// Whether the selection asks for anything besides `id`.
    pub fn requests_beyond_id(&self) -> bool {
        self.names().any(|n| n != "id")
    }

    /// Nested JSON mapping form, e.g. `{"a": {"b": {}}}`.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(n, sub)| (n.clone(), sub.to_value()))
                .collect(),
        )
    }
}

fn path_strings(items: &[Value]) -> Result<Vec<&str>> {
    items
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                Error::configuration(format!("field path must be a string, got {item}"))
            })
        })
        .collect()
}

impl Serialize for FieldSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Anything accepted as a field selection by the read operations.
pub trait IntoFieldSpec {
    fn into_field_spec(self) -> Result<FieldSpec>;
}

impl IntoFieldSpec for FieldSpec {
    fn into_field_spec(self) -> Result<FieldSpec> {
        Ok(self)
    }
}

impl IntoFieldSpec for &FieldSpec {
    fn into_field_spec(self) -> Result<FieldSpec> {
        Ok(self.clone())
    }
}

impl<S: AsRef<str>> IntoFieldSpec for &[S] {
    fn into_field_spec(self) -> Result<FieldSpec> {
        FieldSpec::from_paths(self)
    }
}

impl<S: AsRef<str>, const N: usize> IntoFieldSpec for [S; N] {
    fn into_field_spec(self) -> Result<FieldSpec> {
        FieldSpec::from_paths(self)
    }
}

impl<S: AsRef<str>> IntoFieldSpec for Vec<S> {
    fn into_field_spec(self) -> Result<FieldSpec> {
        FieldSpec::from_paths(self)
    }
}

impl IntoFieldSpec for &Value {
    fn into_field_spec(self) -> Result<FieldSpec> {
        FieldSpec::parse(self)
    }
}

impl IntoFieldSpec for Value {
    fn into_field_spec(self) -> Result<FieldSpec> {
        FieldSpec::parse(&self)
    }
}
