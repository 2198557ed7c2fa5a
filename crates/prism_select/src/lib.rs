//! PRISM Selector
//!
//! Parser for the field-selection grammar clients use to shape a
//! response:
//!
//! ```text
//! selection := field (',' field)*
//! field     := identifier ['{' selection '}'] ['.' 'order' '(' text ')']
//! ```
//!
//! e.g. `title,posts{content,comments{body}}.order(reverse_chronological)`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod parser;
pub mod selection;

pub use parser::parse;
pub use selection::{OrderDirective, SelectionNode, render};
