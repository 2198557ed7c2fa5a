//! PRISM Policy
//!
//! Permission trees: the server-side allow-list that bounds which fields
//! and associations a projection may ever reveal, whatever the client
//! selects. A tree is configured once per endpoint and read concurrently
//! by every projection.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod tree;

pub use config::PermissionConfigError;
pub use tree::{PermissionEntry, PermissionTree, Scope};
