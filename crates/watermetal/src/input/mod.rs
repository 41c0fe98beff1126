//! Input parsing and dataset loading.

mod loader;
mod parser;
mod source;

pub use loader::{canonical_metal, DatasetLoader, LoadReport, LoaderConfig};
pub use parser::{Parser, ParserConfig};
pub use source::{DataTable, SourceMetadata};
