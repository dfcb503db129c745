use std::collections::HashMap;
use serde_json::Value;

/// Open per-token metadata: key to arbitrary JSON value.
pub type Metadata = HashMap<String, Value>;

/// A single indexed unit: the surface string plus metadata stamped by the
/// tokenizer and pipeline stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Token {
    pub text: String,
    pub metadata: Metadata,
}

impl Token {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Token {
            text: text.into(),
            metadata,
        }
    }

    /// A copy with the surface string replaced and metadata carried over.
    pub fn update<F: FnOnce(&str) -> String>(&self, f: F) -> Token {
        Token {
            text: f(&self.text),
            metadata: self.metadata.clone(),
        }
    }
}
