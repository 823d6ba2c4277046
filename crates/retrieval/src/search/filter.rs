//! Metadata filters for similarity search.

use crate::types::Passage;
use scholar_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single per-field condition.
///
/// Deserializes from either a scalar (`"capstone"`) or a list
/// (`["faq", "program"]`), the list meaning "any of".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterCondition {
    AnyOf(Vec<Value>),
    Equals(Value),
}

impl FilterCondition {
    /// Check a stored metadata value against this condition.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FilterCondition::Equals(expected) => values_equal(value, expected),
            FilterCondition::AnyOf(options) => options.iter().any(|o| values_equal(value, o)),
        }
    }
}

/// Numbers compare by value so `3` matches a stored `3.0`.
fn values_equal(stored: &Value, expected: &Value) -> bool {
    match (stored, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => stored == expected,
    }
}

/// Conjunction of field conditions.
///
/// A passage is eligible only if every named field is present in its
/// metadata and satisfies its condition. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFilter {
    conditions: BTreeMap<String, FilterCondition>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn with_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .insert(field.into(), FilterCondition::Equals(value.into()));
        self
    }

    /// Require `field` to equal one of `values`.
    pub fn with_any_of<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.insert(
            field.into(),
            FilterCondition::AnyOf(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&String, &FilterCondition)> {
        self.conditions.iter()
    }

    /// Check whether a passage satisfies every condition.
    pub fn matches(&self, passage: &Passage) -> bool {
        self.conditions.iter().all(|(field, condition)| {
            passage
                .metadata
                .get(field)
                .map(|value| condition.matches(value))
                .unwrap_or(false)
        })
    }

    /// Add an equality condition from a `field=value` argument.
    pub fn parse_pair(self, arg: &str) -> AppResult<Self> {
        let (field, raw) = split_arg(arg)?;
        Ok(self.with_eq(field, parse_value(raw)))
    }

    /// Add a membership condition from a `field=v1,v2,...` argument.
    pub fn parse_any(self, arg: &str) -> AppResult<Self> {
        let (field, raw) = split_arg(arg)?;
        let values: Vec<Value> = raw
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(parse_value)
            .collect();

        if values.is_empty() {
            return Err(AppError::Search(format!(
                "Filter '{}' lists no values",
                arg
            )));
        }

        Ok(self.with_any_of(field, values))
    }
}

fn split_arg(arg: &str) -> AppResult<(&str, &str)> {
    let (field, value) = arg.split_once('=').ok_or_else(|| {
        AppError::Search(format!("Invalid filter '{}': expected field=value", arg))
    })?;

    let field = field.trim();
    if field.is_empty() {
        return Err(AppError::Search(format!(
            "Invalid filter '{}': field name is empty",
            arg
        )));
    }

    Ok((field, value.trim()))
}

/// Numbers and booleans are typed; everything else is a string.
pub fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
