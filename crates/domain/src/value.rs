//! The value model resolved by the engine
//!
//! `Value` is a tagged representation of host data: scalars, ordered
//! sequences, and ordered-insertion maps. It deserializes untagged, so
//! plain JSON or YAML maps onto it directly.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, ResolveResult};
use crate::path::split_path;

/// A node in a document tree.
///
/// The resolution engine never invents new variant kinds, only new
/// instances (for example an integer substituted for a reference
/// string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(OrderedFloat<f64>),
    /// Text, possibly containing `${...}` references.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Ordered-insertion map of string keys to values.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns the variant name, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    /// Returns true for null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for any non-compound variant.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Map(_))
    }

    /// Returns the string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean contents, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer contents, if this is an integer.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float contents, if this is a float.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(f.0),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is a map.
    #[must_use]
    pub const fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Canonical text form, used when a reference is substituted into
    /// surrounding literal text.
    ///
    /// Booleans render as `true`/`false`, null as `null`, numbers via
    /// their display form, strings verbatim, and compound values as
    /// compact JSON.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
            compound => serde_json::to_string(compound).unwrap_or_default(),
        }
    }

    /// Looks up the value at a dot-separated path.
    ///
    /// Numeric segments index into arrays; all other segments are map
    /// keys. Returns `None` if any segment cannot be located.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Self> {
        let mut current = self;
        for segment in split_path(path) {
            current = match current {
                Self::Map(entries) => entries.get(segment)?,
                Self::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Replaces or inserts the value at a dot-separated path.
    ///
    /// Every intermediate segment must already exist; the final
    /// segment inserts into a map or replaces an in-bounds array
    /// element.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::PathNotFound`] if an intermediate
    /// segment is missing or the final segment cannot receive a value.
    pub fn set_path(&mut self, path: &str, value: Self) -> ResolveResult<()> {
        let segments = split_path(path);
        let Some((last, parents)) = segments.split_last() else {
            return Err(ResolveError::PathNotFound {
                path: path.to_string(),
            });
        };

        let mut current = self;
        let mut walked: Vec<&str> = Vec::with_capacity(parents.len());
        for segment in parents {
            walked.push(*segment);
            current = match current {
                Self::Map(entries) => entries.get_mut(*segment),
                Self::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get_mut(index)),
                _ => None,
            }
            .ok_or_else(|| ResolveError::PathNotFound {
                path: walked.join("."),
            })?;
        }

        match current {
            Self::Map(entries) => {
                entries.insert((*last).to_string(), value);
                Ok(())
            }
            Self::Array(items) => {
                let index = last
                    .parse::<usize>()
                    .ok()
                    .filter(|index| *index < items.len())
                    .ok_or_else(|| ResolveError::PathNotFound {
                        path: path.to_string(),
                    })?;
                items[index] = value;
                Ok(())
            }
            _ => Err(ResolveError::PathNotFound {
                path: path.to_string(),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(OrderedFloat(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Self::Map(entries)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_i64().map_or_else(
                || Self::Float(OrderedFloat(n.as_f64().unwrap_or(f64::NAN))),
                Self::Int,
            ),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Int(i) => Self::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f.0).map_or(Self::Null, Self::Number),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            Value::Map(entries) => Self::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}
