//! Per-request diagnostics.
//!
//! Recoverable problems found while projecting (an unknown order
//! direction, a collection that cannot be sorted, a field the allow-list
//! hides) are collected here instead of failing the request. A collector
//! is created for each projection and handed back with the result, so
//! concurrent requests never see each other's entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Extra information for API consumers
    Info,
    /// Non-fatal problem with the request
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// What a diagnostic is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A requested field was withheld by the allow-list
    FieldNotPermitted,
    /// Ordering was requested by a key the elements do not have
    InvalidOrderField,
    /// Ordering was requested on something that cannot be ordered
    UnorderableCollection,
    /// The order directive was not a known direction
    InvalidOrderDirection,
    /// Metadata could not be merged because the body is not an object
    MetadataForNonObjectBody,
    /// Metadata could not be merged because the body is not JSON
    MetadataForNonJsonBody,
}

impl DiagnosticKind {
    /// Severity recorded for this kind
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::FieldNotPermitted => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

/// A single diagnostic entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity, serialized as `type`
    #[serde(rename = "type")]
    pub severity: Severity,
    /// What the diagnostic is about
    pub kind: DiagnosticKind,
    /// Human-readable description
    pub message: String,
}

/// Which diagnostics a client asked to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLevel {
    /// Surface nothing
    #[default]
    None,
    /// Surface only info entries
    Info,
    /// Surface only warning entries
    Warning,
    /// Surface everything
    All,
}

impl DebugLevel {
    /// Check whether entries of `severity` are surfaced at this level
    #[must_use]
    pub fn admits(&self, severity: Severity) -> bool {
        match self {
            Self::None => false,
            Self::Info => severity == Severity::Info,
            Self::Warning => severity == Severity::Warning,
            Self::All => true,
        }
    }

    /// Parse a query parameter, treating anything unrecognized as `None`
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::parse::<Self>) {
            Some(Ok(level)) => level,
            Some(Err(raw)) => {
                tracing::debug!(param = %raw, "ignoring unknown debug level");
                Self::None
            }
            None => Self::None,
        }
    }
}

impl FromStr for DebugLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "all" => Ok(Self::All),
            _ => Err(s.to_string()),
        }
    }
}

/// Collector for the diagnostics of one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a diagnostic and mirror it to the tracing subscriber
    pub fn record(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        let severity = kind.severity();
        match severity {
            Severity::Info => tracing::debug!(?kind, "{}", message),
            Severity::Warning => tracing::warn!(?kind, "{}", message),
        }
        self.entries.push(Diagnostic {
            severity,
            kind,
            message,
        });
    }

    /// All entries in the order they were recorded
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Entries surfaced at `level`
    #[must_use]
    pub fn filtered(&self, level: DebugLevel) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|entry| level.admits(entry.severity))
            .collect()
    }

    /// Check if any entry of `kind` was recorded
    #[must_use]
    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|entry| entry.kind == kind)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Move all entries of `other` into this collector
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}
