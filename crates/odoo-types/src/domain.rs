//! Search domains.
//!
//! A domain is a prefix-notation filter: a flat list of `[field, operator,
//! value]` clauses interleaved with the logical tokens `&`, `|` and `!`.
//! Consecutive clauses without a token are implicitly and-ed by the server.
//!
//! ```
//! use odoo_types::Domain;
//! use serde_json::json;
//!
//! let domain = Domain::new()
//!     .clause("date", ">=", "2024-01-01")
//!     .clause("date", "<", "2024-02-01");
//! assert_eq!(
//!     domain.to_value(),
//!     json!([["date", ">=", "2024-01-01"], ["date", "<", "2024-02-01"]])
//! );
//! ```

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Logical operator token of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "&",
            LogicalOp::Or => "|",
            LogicalOp::Not => "!",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "&" => Some(LogicalOp::And),
            "|" => Some(LogicalOp::Or),
            "!" => Some(LogicalOp::Not),
            _ => None,
        }
    }
}

/// One element of a domain.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainTerm {
    Clause {
        field: String,
        operator: String,
        value: Value,
    },
    Operator(LogicalOp),
}

impl DomainTerm {
    fn to_value(&self) -> Value {
        match self {
            DomainTerm::Clause {
                field,
                operator,
                value,
            } => Value::Array(vec![
                Value::String(field.clone()),
                Value::String(operator.clone()),
                value.clone(),
            ]),
            DomainTerm::Operator(op) => Value::String(op.as_str().to_string()),
        }
    }

    /// Parse one element as echoed back by the server.
    ///
    /// Returns `None` for anything that is neither a 3-element clause with
    /// string field and operator nor a logical token.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(token) => LogicalOp::parse(token).map(DomainTerm::Operator),
            Value::Array(items) if items.len() == 3 => {
                let field = items[0].as_str()?;
                let operator = items[1].as_str()?;
                Some(DomainTerm::Clause {
                    field: field.to_string(),
                    operator: operator.to_string(),
                    value: items[2].clone(),
                })
            }
            _ => None,
        }
    }
}

/// An ordered domain expression. The empty domain matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
    terms: Vec<DomainTerm>,
}

impl Domain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `[field, operator, value]` clause.
    #[must_use]
    pub fn clause(mut self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.terms.push(DomainTerm::Clause {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.into(),
        });
        self
    }

    /// Append a logical operator token.
    #[must_use]
    pub fn op(mut self, op: LogicalOp) -> Self {
        self.terms.push(DomainTerm::Operator(op));
        self
    }

    /// Leniently parse a domain echoed by the server (e.g. `__domain` in
    /// grouped rows). Elements that are not clauses or tokens are dropped.
    pub fn from_value(value: &Value) -> Self {
        let terms = value
            .as_array()
            .map(|items| items.iter().filter_map(DomainTerm::from_value).collect())
            .unwrap_or_default();
        Self { terms }
    }

    pub fn terms(&self) -> &[DomainTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over `(field, operator, value)` of every clause, skipping tokens.
    pub fn clauses(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.terms.iter().filter_map(|term| match term {
            DomainTerm::Clause {
                field,
                operator,
                value,
            } => Some((field.as_str(), operator.as_str(), value)),
            DomainTerm::Operator(_) => None,
        })
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.terms.iter().map(DomainTerm::to_value).collect())
    }
}

impl From<Vec<DomainTerm>> for Domain {
    fn from(terms: Vec<DomainTerm>) -> Self {
        Self { terms }
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
