pub mod document;
mod path;
/// XML parsing and serialization.
pub mod xml;

pub use document::{Document, Element, NodeId, NodeKind};
pub use path::default_output_path;
pub use xml::{ParseError, WriteError};
