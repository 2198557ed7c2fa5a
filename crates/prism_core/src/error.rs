//! Core error types for PRISM.

use std::fmt;

/// Core result type
pub type PrismResult<T> = Result<T, PrismError>;

/// Core error type
///
/// Only failures that abort a whole projection live here. Degraded
/// behaviour (bad ordering, denied fields, metadata that cannot be
/// merged) is reported through [`crate::Diagnostics`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrismError {
    /// Selector string could not be parsed
    Syntax {
        /// Byte offset into the selector where the problem was found
        position: usize,
        /// What was wrong
        reason: String,
    },

    /// A permitted field does not exist on the object being projected
    AttributeNotFound {
        /// Type name reported by the object
        type_name: String,
        /// Requested attribute
        attribute: String,
    },

    /// Invalid configuration (permission list, projector settings)
    InvalidConfig {
        /// What was wrong
        reason: String,
    },

    /// Invalid JSON encoding
    InvalidEncoding {
        /// Underlying decoder message
        reason: String,
    },
}

impl PrismError {
    /// Build a syntax error at `position`
    #[must_use]
    pub fn syntax(position: usize, reason: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            reason: reason.into(),
        }
    }

    /// Whether this error was caused by the client's selector
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

impl fmt::Display for PrismError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { position, reason } => {
                write!(f, "Selector syntax error at {}: {}", position, reason)
            }
            Self::AttributeNotFound {
                type_name,
                attribute,
            } => write!(f, "Attribute {} not found on {}", attribute, type_name),
            Self::InvalidConfig { reason } => write!(f, "Invalid configuration: {}", reason),
            Self::InvalidEncoding { reason } => write!(f, "Invalid encoding: {}", reason),
        }
    }
}

impl std::error::Error for PrismError {}

impl From<serde_json::Error> for PrismError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidEncoding {
            reason: err.to_string(),
        }
    }
}
