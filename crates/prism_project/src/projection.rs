//! Output value tree.

use indexmap::IndexMap;
use prism_core::Scalar;
use serde::Serialize;
use serde_json::Value;

/// Result of projecting a value through a selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Projection {
    /// Selected fields, in selection order
    Object(IndexMap<String, Projection>),
    /// Projected elements of a sequence
    Array(Vec<Projection>),
    /// Leaf value
    Scalar(Scalar),
}

impl Projection {
    /// An object with no keys
    #[must_use]
    pub fn empty_object() -> Self {
        Self::Object(IndexMap::new())
    }

    /// Get a key of an object projection
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Projection> {
        match self {
            Self::Object(members) => members.get(key),
            _ => None,
        }
    }

    /// Element of an array projection
    #[must_use]
    pub fn index(&self, index: usize) -> Option<&Projection> {
        match self {
            Self::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Check if this is an object without keys
    #[must_use]
    pub fn is_empty_object(&self) -> bool {
        matches!(self, Self::Object(members) if members.is_empty())
    }

    /// Convert to JSON, keeping key order
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Scalar(scalar) => scalar.to_json(),
        }
    }
}

impl From<Scalar> for Projection {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}
