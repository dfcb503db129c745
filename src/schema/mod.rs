pub mod schema;

pub use schema::{DocumentAttributes, Extractor, FieldAttributes, FieldKind};
