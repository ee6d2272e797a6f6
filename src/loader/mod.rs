//! Reading API descriptions: parsing, `$ref` resolution and source ranges.

pub mod document;
pub mod resolver;
pub mod source_map;

pub use document::{Document, parse_tree};
pub use resolver::{RefTarget, lookup_pointer, ref_of};
pub use source_map::SourceMap;

use crate::error::Result;
use std::path::Path;

/// Load and resolve the document at `path`
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    Document::load(path)
}
