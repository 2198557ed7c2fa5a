//! PRISM Projection
//!
//! Turns an object graph, a parsed selection and a permission scope into
//! an output value tree. Nested collections can be reordered on the way
//! through, and the renderer ties the pieces to the query parameters of
//! a request (`fields`, `metadata`, `debug`).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod metadata;
pub mod order;
pub mod projection;
pub mod projector;
pub mod render;

pub use metadata::{Metadata, describe};
pub use order::order_sequence;
pub use projection::Projection;
pub use projector::{CollectionWrapping, Projector, ProjectorConfig};
pub use render::{Body, RenderRequest, Rendered, Renderer};
