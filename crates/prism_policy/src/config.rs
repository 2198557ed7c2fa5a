//! Loading permission trees from configuration.
//!
//! The configuration format is a JSON list. A bare string permits a
//! field as a leaf; a mapping permits each of its keys and scopes the
//! nested fields under the key's value (a string, a list or another
//! mapping). `null` means no allow-list at all.
//!
//! ```json
//! ["title", "author", {"posts": ["content", {"comments": "body"}]}]
//! ```

use crate::tree::{PermissionEntry, PermissionTree};
use prism_core::{PrismError, PrismResult};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Permission configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionConfigError {
    /// A value that is neither a field name, a list nor a mapping
    #[error("Invalid permission entry at {path}: expected a name, list or mapping, found {found}")]
    InvalidEntry { path: String, found: String },

    /// A field name that is empty or blank
    #[error("Empty field name at {path}")]
    EmptyName { path: String },

    /// A list directly inside a list
    #[error("Nested list at {path}: nested fields must be keyed by their association")]
    NestedList { path: String },
}

impl From<PermissionConfigError> for PrismError {
    fn from(err: PermissionConfigError) -> Self {
        PrismError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

impl PermissionTree {
    /// Build a tree from its JSON configuration
    ///
    /// # Errors
    ///
    /// Returns [`PermissionConfigError`] if an entry is not a field name,
    /// list or mapping, or if a field name is blank.
    pub fn from_json(config: &Value) -> Result<Self, PermissionConfigError> {
        match config {
            Value::Null => Ok(Self::unrestricted()),
            other => Ok(Self::restricted(parse_level(other, "$")?)),
        }
    }

    /// Build a tree from JSON configuration text
    ///
    /// # Errors
    ///
    /// Returns [`PrismError::InvalidEncoding`] for malformed JSON and
    /// [`PrismError::InvalidConfig`] for a malformed allow-list.
    pub fn from_json_str(config: &str) -> PrismResult<Self> {
        let value: Value = serde_json::from_str(config)?;
        Ok(Self::from_json(&value)?)
    }

    /// Convert the tree back to its JSON configuration
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self.entries() {
            None => Value::Null,
            Some(entries) => entries_to_json(entries),
        }
    }
}

/// Entries for one level: a single name, a list, or a mapping
fn parse_level(value: &Value, path: &str) -> Result<Vec<PermissionEntry>, PermissionConfigError> {
    match value {
        Value::String(name) => Ok(vec![PermissionEntry::Leaf(field_name(name, path)?)]),
        Value::Object(members) => parse_mapping(members, path),
        Value::Array(items) => {
            let mut entries = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let path = format!("{}[{}]", path, i);
                match item {
                    Value::String(name) => {
                        entries.push(PermissionEntry::Leaf(field_name(name, &path)?));
                    }
                    Value::Object(members) => entries.extend(parse_mapping(members, &path)?),
                    Value::Array(_) => return Err(PermissionConfigError::NestedList { path }),
                    other => return Err(invalid_entry(other, path)),
                }
            }
            Ok(entries)
        }
        other => Err(invalid_entry(other, path.to_string())),
    }
}

fn parse_mapping(
    members: &Map<String, Value>,
    path: &str,
) -> Result<Vec<PermissionEntry>, PermissionConfigError> {
    members
        .iter()
        .map(|(name, children)| {
            let name = field_name(name, path)?;
            let children = parse_level(children, &format!("{}.{}", path, name))?;
            Ok(PermissionEntry::Scoped(name, children))
        })
        .collect()
}

fn field_name(name: &str, path: &str) -> Result<String, PermissionConfigError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PermissionConfigError::EmptyName {
            path: path.to_string(),
        });
    }
    Ok(name.to_string())
}

fn invalid_entry(value: &Value, path: String) -> PermissionConfigError {
    let found = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    };
    PermissionConfigError::InvalidEntry {
        path,
        found: found.to_string(),
    }
}

fn entries_to_json(entries: &[PermissionEntry]) -> Value {
    Value::Array(entries.iter().map(entry_to_json).collect())
}

fn entry_to_json(entry: &PermissionEntry) -> Value {
    match entry {
        PermissionEntry::Leaf(name) => Value::String(name.clone()),
        PermissionEntry::Scoped(name, children) => {
            let mut members = Map::new();
            members.insert(name.clone(), entries_to_json(children));
            Value::Object(members)
        }
    }
}

impl Serialize for PermissionEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(name) => serializer.serialize_str(name),
            Self::Scoped(name, children) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, children)?;
                map.end()
            }
        }
    }
}

impl Serialize for PermissionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.entries() {
            None => serializer.serialize_none(),
            Some(entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for entry in entries {
                    seq.serialize_element(entry)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PermissionTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let config = Option::<Value>::deserialize(deserializer)?;
        match config {
            None => Ok(Self::unrestricted()),
            Some(value) => Self::from_json(&value).map_err(serde::de::Error::custom),
        }
    }
}
