use serde::{Serialize, Deserialize};
use std::fmt;
use std::sync::Arc;
use crate::core::types::{Document, FieldValue};

/// Indexing behaviour of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldKind {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
}

/// Maps a document to the value indexed for a field, in place of the field's
/// own entry in the document.
pub type Extractor = Arc<dyn Fn(&Document) -> Option<FieldValue> + Send + Sync>;

/// Per-field indexing attributes.
#[derive(Clone)]
pub struct FieldAttributes {
    pub boost: f64,
    pub extractor: Option<Extractor>,
    pub kind: FieldKind,
}

impl Default for FieldAttributes {
    fn default() -> Self {
        FieldAttributes {
            boost: 1.0,
            extractor: None,
            kind: FieldKind::String,
        }
    }
}

impl FieldAttributes {
    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_extractor(
        mut self,
        extractor: impl Fn(&Document) -> Option<FieldValue> + Send + Sync + 'static,
    ) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }
}

impl fmt::Debug for FieldAttributes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FieldAttributes")
            .field("boost", &self.boost)
            .field("extractor", &self.extractor.as_ref().map(|_| "<fn>"))
            .field("kind", &self.kind)
            .finish()
    }
}

/// Per-document indexing attributes.
#[derive(Debug, Clone, Copy)]
pub struct DocumentAttributes {
    pub boost: f64,
}

impl Default for DocumentAttributes {
    fn default() -> Self {
        DocumentAttributes { boost: 1.0 }
    }
}
