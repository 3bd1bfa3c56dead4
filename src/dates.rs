//! Date bucket canonicalization for grouped reads.
//!
//! Grouping on `date:month` (or `:quarter`, `:week`, `:day`, `:hour`) makes
//! the server render each bucket as a localized label such as `"January
//! 2024"` or `"W05 2024"`. This module rewrites those labels into sortable,
//! locale-free strings:
//!
//! | Suffix | Server label | Canonical |
//! |--------|--------------|-----------|
//! | `:quarter` | `Q1 2024` | `2024-Q1` |
//! | `:month` | `January 2024` | `2024-01` |
//! | `:week` | `W5 2024` | `2024-W05` |
//! | `:day` | `07 Jan 2024` | `2024-01-07` |
//! | `:hour` | `13:00 07 Jan` | window start, e.g. `2024-01-07 13:00:00` |
//!
//! The `:hour` bucket is not reformatted: it is replaced with the start of
//! the bucket's window when one is known, and left as-is otherwise.

use odoo_types::{is_truthy, Domain, Record};
use serde_json::Value;
use tracing::trace;

/// Temporal granularity of a group-by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBucket {
    Quarter,
    Month,
    Week,
    Day,
    Hour,
}

impl DateBucket {
    /// Split `"date:month"` into `("date", Month)`. `None` for fields
    /// without a recognized suffix.
    pub fn split_field(field: &str) -> Option<(&str, DateBucket)> {
        let bucket = [
            (":quarter", DateBucket::Quarter),
            (":month", DateBucket::Month),
            (":week", DateBucket::Week),
            (":day", DateBucket::Day),
            (":hour", DateBucket::Hour),
        ]
        .into_iter()
        .find(|(suffix, _)| field.ends_with(suffix))
        .map(|(_, bucket)| bucket)?;
        let raw = field.split_once(':').map_or(field, |(raw, _)| raw);
        Some((raw, bucket))
    }

    /// Canonical form of one bucket value. Values that are falsy, not
    /// strings, or do not match the expected label pass through unchanged.
    pub fn canonicalize(self, value: &Value, window: &DateWindow) -> Value {
        if !is_truthy(value) {
            return value.clone();
        }
        if self == DateBucket::Hour {
            return match &window.from {
                Some(from) if is_truthy(from) => from.clone(),
                _ => value.clone(),
            };
        }
        let Some(label) = value.as_str() else {
            return value.clone();
        };
        let formatted = match self {
            DateBucket::Quarter => format_quarter(label),
            DateBucket::Month => format_month(label),
            DateBucket::Week => format_week(label),
            DateBucket::Day => format_day(label),
            DateBucket::Hour => None,
        };
        match formatted {
            Some(s) => Value::String(s),
            None => value.clone(),
        }
    }
}

/// Month number from a (possibly localized) month name, by its first three
/// lowercase letters. Unknown names map to 0.
pub fn month_number(name: &str) -> u32 {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => 0,
    }
}

// =============================================================================
// Label parsing
// =============================================================================
// Each label is matched as a prefix; trailing text is ignored.

fn take_digits(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (end > 0).then(|| s.split_at(end))
}

fn take_word(s: &str) -> Option<(&str, &str)> {
    let end = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    (end > 0).then(|| s.split_at(end))
}

fn take_char(s: &str, c: char) -> Option<&str> {
    s.strip_prefix(c)
}

/// `Q<d> <year>`
fn format_quarter(label: &str) -> Option<String> {
    let rest = take_char(label, 'Q')?;
    let quarter = rest.chars().next().filter(char::is_ascii_digit)?;
    let rest = take_char(&rest[quarter.len_utf8()..], ' ')?;
    let (year, _) = take_digits(rest)?;
    Some(format!("{year}-Q{quarter}"))
}

/// `<MonthName> <year>`
fn format_month(label: &str) -> Option<String> {
    let (month, rest) = take_word(label)?;
    let (year, _) = take_digits(take_char(rest, ' ')?)?;
    Some(format!("{year}-{:02}", month_number(month)))
}

/// `W<week> <year>`
fn format_week(label: &str) -> Option<String> {
    let (week, rest) = take_word(take_char(label, 'W')?)?;
    let week: u32 = week.parse().ok()?;
    let (year, _) = take_digits(take_char(rest, ' ')?)?;
    Some(format!("{year}-W{week:02}"))
}

/// `<day> <MonthName> <year>`
fn format_day(label: &str) -> Option<String> {
    let (day, rest) = take_digits(label)?;
    let day: u32 = day.parse().ok()?;
    let (month, rest) = take_word(take_char(rest, ' ')?)?;
    let (year, _) = take_digits(take_char(rest, ' ')?)?;
    Some(format!("{year}-{:02}-{day:02}", month_number(month)))
}

// =============================================================================
// Bucket windows
// =============================================================================

/// Bounds of one bucket: `from` inclusive, `to` exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateWindow {
    pub from: Option<Value>,
    pub to: Option<Value>,
}

impl DateWindow {
    /// Window from the explicit `__range` map of a grouped row.
    pub fn from_range(row: &Record, raw_field: &str) -> Self {
        let Some(range) = row.get("__range").and_then(|r| r.get(raw_field)) else {
            return Self::default();
        };
        Self {
            from: range.get("from").cloned(),
            to: range.get("to").cloned(),
        }
    }

    /// Window reconstructed from the `__domain` echoed in a grouped row: the
    /// first `>=` clause on the field gives `from`, the first `<` gives `to`.
    pub fn from_domain(row: &Record, raw_field: &str) -> Self {
        let mut window = Self::default();
        let Some(raw) = row.get("__domain") else {
            return window;
        };
        for (field, operator, value) in Domain::from_value(raw).clauses() {
            if field != raw_field {
                continue;
            }
            match operator {
                ">=" if window.from.is_none() => window.from = Some(value.clone()),
                "<" if window.to.is_none() => window.to = Some(value.clone()),
                _ => {}
            }
        }
        window
    }
}

/// Where bucket windows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSource {
    /// Servers 15+ report `__range` per group-by field.
    Range,
    /// Older servers only echo the group's `__domain`.
    Domain,
}

impl WindowSource {
    pub fn for_major_version(major: u32) -> Self {
        if major >= 15 {
            WindowSource::Range
        } else {
            WindowSource::Domain
        }
    }

    fn window(self, row: &Record, raw_field: &str) -> DateWindow {
        match self {
            WindowSource::Range => DateWindow::from_range(row, raw_field),
            WindowSource::Domain => DateWindow::from_domain(row, raw_field),
        }
    }
}

/// Rewrite the date-bucket values of grouped rows in place.
///
/// Only group fields with a recognized suffix are touched; rows lacking
/// the field are left alone.
pub fn canonicalize_rows<S: AsRef<str>>(
    rows: &mut [Record],
    group_fields: &[S],
    source: WindowSource,
) {
    for field in group_fields {
        let field = field.as_ref();
        let Some((raw_field, bucket)) = DateBucket::split_field(field) else {
            continue;
        };
        for row in rows.iter_mut() {
            let Some(value) = row.get(field) else {
                continue;
            };
            let window = source.window(row, raw_field);
            let canonical = bucket.canonicalize(value, &window);
            trace!(field, from = %value, to = %canonical, "canonicalized date bucket");
            row.insert(field.to_string(), canonical);
        }
    }
}
