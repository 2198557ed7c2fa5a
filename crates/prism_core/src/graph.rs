//! Object graph capabilities.
//!
//! The projector never owns or builds the data it projects. It reads an
//! object graph through these traits: objects answer attribute lookups by
//! name, sequences hand out their elements and may offer a native
//! order-by (a query builder, say) instead of being sorted in memory.

use crate::value::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction handed to an order-by capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Declared shape of an object type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Plain attributes (columns)
    pub fields: Vec<String>,
    /// Attributes that resolve to other objects or sequences of objects
    pub associations: Vec<String>,
}

impl Schema {
    /// Create a schema from field and association names
    #[must_use]
    pub fn new<F, A>(fields: F, associations: A) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            associations: associations.into_iter().map(Into::into).collect(),
        }
    }
}

/// An object that can be asked for attributes by name
pub trait GraphObject {
    /// Name of the object's type, used in errors and diagnostics
    fn type_name(&self) -> &str;

    /// Declared fields and associations of the object's type
    fn schema(&self) -> Schema;

    /// Look up an attribute. `None` means the object has no such attribute.
    fn get_attribute(&self, name: &str) -> Option<GraphValue<'_>>;

    /// Check whether the attribute exists
    fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }
}

/// Outcome of asking a sequence to order itself
pub enum NativeOrder<'a> {
    /// The sequence has no native order-by; sort it in memory
    Unsupported,
    /// The sequence can order, but not by the requested key
    UnknownKey,
    /// Elements in the requested order
    Ordered(Vec<GraphValue<'a>>),
}

/// An ordered collection of graph values
pub trait GraphSequence {
    /// Materialize the elements in their natural order
    fn elements(&self) -> Vec<GraphValue<'_>>;

    /// Schema of the element type.
    ///
    /// Defaults to the schema of the first object element.
    fn schema(&self) -> Option<Schema> {
        self.elements().iter().find_map(|element| match element {
            GraphValue::Object(object) => Some(object.schema()),
            _ => None,
        })
    }

    /// Order by `key` using the sequence's own capability, if it has one
    fn native_order_by(&self, _key: &str, _direction: Direction) -> NativeOrder<'_> {
        NativeOrder::Unsupported
    }
}

/// A value in an object graph
pub enum GraphValue<'a> {
    /// Leaf value
    Scalar(Scalar),
    /// Object with named attributes
    Object(Box<dyn GraphObject + 'a>),
    /// Ordered collection
    Sequence(Box<dyn GraphSequence + 'a>),
}

impl<'a> GraphValue<'a> {
    /// Wrap an object
    #[must_use]
    pub fn object(object: impl GraphObject + 'a) -> Self {
        Self::Object(Box::new(object))
    }

    /// Wrap a sequence
    #[must_use]
    pub fn sequence(sequence: impl GraphSequence + 'a) -> Self {
        Self::Sequence(Box::new(sequence))
    }

    /// Wrap a scalar
    #[must_use]
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        Self::Scalar(value.into())
    }

    /// Check if this value is a sequence
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    /// Get a string representation of the value kind
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Scalar(scalar) => scalar.kind_name(),
            Self::Object(object) => object.type_name(),
            Self::Sequence(_) => "sequence",
        }
    }

    /// Schema of the value: the object's own, or its element type's
    #[must_use]
    pub fn schema(&self) -> Option<Schema> {
        match self {
            Self::Scalar(_) => None,
            Self::Object(object) => Some(object.schema()),
            Self::Sequence(sequence) => sequence.schema(),
        }
    }
}

impl fmt::Debug for GraphValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => f.debug_tuple("Scalar").field(scalar).finish(),
            Self::Object(object) => f.debug_tuple("Object").field(&object.type_name()).finish(),
            Self::Sequence(_) => f.write_str("Sequence"),
        }
    }
}

impl<T: GraphObject + ?Sized> GraphObject for &T {
    fn type_name(&self) -> &str {
        (**self).type_name()
    }

    fn schema(&self) -> Schema {
        (**self).schema()
    }

    fn get_attribute(&self, name: &str) -> Option<GraphValue<'_>> {
        (**self).get_attribute(name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        (**self).has_attribute(name)
    }
}

impl<T: GraphSequence + ?Sized> GraphSequence for &T {
    fn elements(&self) -> Vec<GraphValue<'_>> {
        (**self).elements()
    }

    fn schema(&self) -> Option<Schema> {
        (**self).schema()
    }

    fn native_order_by(&self, key: &str, direction: Direction) -> NativeOrder<'_> {
        (**self).native_order_by(key, direction)
    }
}

impl<T: GraphObject> GraphSequence for Vec<T> {
    fn elements(&self) -> Vec<GraphValue<'_>> {
        self.iter().map(GraphValue::object).collect()
    }
}
