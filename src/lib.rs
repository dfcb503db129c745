//! Embeddable in-memory full-text search.
//!
//! A [`Builder`] ingests a batch of structured documents, runs their field
//! values through a configurable analysis pipeline, and materializes an
//! immutable [`Index`]: an inverted index with BM25-weighted field vectors, a
//! minimized-DFA vocabulary supporting wildcard and fuzzy expansion, and a
//! sorted map over numeric field values. The index answers free-text queries
//! (`index.search("...")`) or programmatic ones (`index.query(|q| ...)`) and
//! returns ranked document refs with per-match metadata.
//!
//! ```text
//!  documents ──▶ Builder ──▶ Index ◀── Query ◀── QueryParser ◀── "title:cat^2"
//!                  │           │
//!       tokenizer + pipeline   ├── inverted index (term → posting)
//!       term/field frequencies ├── field vectors  (BM25, per doc+field)
//!       BM25 normalization     ├── token set      (minimized DFA)
//!                              └── number map     (value → tokens)
//! ```
//!
//! Everything is synchronous and single-threaded; a built index is immutable
//! and may be serialized to JSON and loaded back.
//!
//! ```ignore
//! use scry::{Builder, Document, DocumentAttributes, FieldAttributes, FieldValue};
//!
//! let mut builder = Builder::standard();
//! builder.reference("id");
//! builder.field("title", FieldAttributes::default())?;
//!
//! let mut doc = Document::new();
//! doc.add_field("id", FieldValue::Text("a".into()));
//! doc.add_field("title", FieldValue::Text("green eggs and ham".into()));
//! builder.add(&doc, DocumentAttributes::default())?;
//!
//! let index = builder.build()?;
//! let results = index.search("eggs")?;
//! ```

pub mod core;
pub mod schema;
pub mod analysis;
pub mod scoring;
pub mod index;
pub mod query;
pub mod search;

pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{Document, FieldRef, FieldValue};
pub use crate::index::builder::Builder;
pub use crate::index::number_map::{Comparator, NumberMap, RangeBound};
pub use crate::index::token_set::TokenSet;
pub use crate::index::token_set_builder::TokenSetBuilder;
pub use crate::query::ast::{Clause, ClauseOptions, Presence, Query, QueryTerm, Wildcard};
pub use crate::schema::{DocumentAttributes, FieldAttributes, FieldKind};
pub use crate::search::index::Index;
pub use crate::search::match_data::MatchData;
pub use crate::search::results::SearchResult;
