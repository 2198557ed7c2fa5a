//! PRISM Core Types
//!
//! The object-graph capability interface that projections read from,
//! the scalar value model, the shared error type, and the per-request
//! diagnostics collector. Everything here is pure: no I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod json;
pub mod value;

// Re-exports
pub use diagnostics::{DebugLevel, Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{PrismError, PrismResult};
pub use graph::{Direction, GraphObject, GraphSequence, GraphValue, NativeOrder, Schema};
pub use json::{JsonArray, JsonObject};
pub use value::Scalar;
