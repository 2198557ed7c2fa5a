//! Selection tree produced by the parser.

use prism_core::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

const CHRONOLOGICAL: &str = "chronological";
const REVERSE_CHRONOLOGICAL: &str = "reverse_chronological";

/// Ordering requested for a nested collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirective {
    /// `order(chronological)`
    Chronological,
    /// `order(reverse_chronological)`
    ReverseChronological,
    /// Anything else, kept verbatim so it can be reported
    Invalid(String),
}

impl OrderDirective {
    /// Classify the text found between the parentheses of `.order(...)`
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            CHRONOLOGICAL => Self::Chronological,
            REVERSE_CHRONOLOGICAL => Self::ReverseChronological,
            other => Self::Invalid(other.to_string()),
        }
    }

    /// Sort direction, or `None` for an invalid directive.
    ///
    /// Chronological is `Asc`, reverse chronological is `Desc`.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Chronological => Some(Direction::Asc),
            Self::ReverseChronological => Some(Direction::Desc),
            Self::Invalid(_) => None,
        }
    }

    /// Token as written in a selector
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Chronological => CHRONOLOGICAL,
            Self::ReverseChronological => REVERSE_CHRONOLOGICAL,
            Self::Invalid(raw) => raw,
        }
    }
}

/// One requested field, possibly with nested fields and an ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionNode {
    /// Field name
    pub name: String,
    /// Nested selection, present when the field was written with braces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SelectionNode>>,
    /// Ordering directive attached with `.order(...)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderDirective>,
}

impl SelectionNode {
    /// Create a leaf selection
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: None,
            order: None,
        }
    }

    /// Set the nested selection
    #[must_use]
    pub fn with_children(mut self, children: Vec<SelectionNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Set the ordering directive
    #[must_use]
    pub fn with_order(mut self, order: OrderDirective) -> Self {
        self.order = Some(order);
        self
    }

    /// Check if the field was requested without braces
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

impl fmt::Display for SelectionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(children) = &self.children {
            write!(f, "{{{}}}", render(children))?;
        }
        if let Some(order) = &self.order {
            write!(f, ".order({})", order.token())?;
        }
        Ok(())
    }
}

/// Render a selection back to its canonical selector string
#[must_use]
pub fn render(nodes: &[SelectionNode]) -> String {
    nodes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
