use std::sync::LazyLock;
use regex::Regex;
use serde_json::json;
use crate::analysis::token::{Metadata, Token};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::FieldValue;

static DEFAULT_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-]+").expect("default separator pattern is valid"));

/// Splits raw field values into position-stamped tokens.
///
/// Runs of characters not matching the separator become tokens; each token is
/// stamped with `position = [start, length]` (byte offsets into the trimmed,
/// lowercased input) and `index` (its ordinal within the field).
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pub separator: Regex,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            separator: DEFAULT_SEPARATOR.clone(),
        }
    }
}

impl Tokenizer {
    pub fn new(separator: &str) -> Result<Self> {
        let separator = Regex::new(separator).map_err(|e| {
            Error::new(
                ErrorKind::InvalidArgument,
                format!("invalid separator pattern: {}", e),
            )
        })?;
        Ok(Tokenizer { separator })
    }

    pub fn tokenize(&self, value: &FieldValue, metadata: &Metadata) -> Vec<Token> {
        match value {
            FieldValue::Text(text) => self.tokenize_str(text, metadata),
            FieldValue::Number(number) => self.tokenize_str(&number.to_string(), metadata),
            FieldValue::List(items) => items
                .iter()
                .map(|item| Token::new(item.to_lowercase(), metadata.clone()))
                .collect(),
        }
    }

    pub fn tokenize_str(&self, raw: &str, metadata: &Metadata) -> Vec<Token> {
        let text = raw.trim().to_lowercase();
        let mut tokens = Vec::new();
        let mut last = 0;

        for separator_match in self.separator.find_iter(&text) {
            self.push_token(&text, last..separator_match.start(), metadata, &mut tokens);
            last = separator_match.end();
        }
        self.push_token(&text, last..text.len(), metadata, &mut tokens);

        tokens
    }

    fn push_token(
        &self,
        text: &str,
        span: std::ops::Range<usize>,
        metadata: &Metadata,
        tokens: &mut Vec<Token>,
    ) {
        if span.is_empty() {
            return;
        }

        let mut token_metadata = metadata.clone();
        token_metadata.insert(
            "position".to_string(),
            json!([span.start, span.end - span.start]),
        );
        token_metadata.insert("index".to_string(), json!(tokens.len()));
        tokens.push(Token::new(&text[span], token_metadata));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn splits_on_whitespace_and_hyphens() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize_str("foo bar-baz", &Metadata::new());
        assert_eq!(texts(&tokens), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn lowercases_and_trims() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize_str("  Hello World  ", &Metadata::new());
        assert_eq!(texts(&tokens), vec!["hello", "world"]);
    }

    #[test]
    fn stamps_position_and_index() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize_str("green eggs", &Metadata::new());

        assert_eq!(tokens[0].metadata["position"], json!([0, 5]));
        assert_eq!(tokens[0].metadata["index"], json!(0));
        assert_eq!(tokens[1].metadata["position"], json!([6, 4]));
        assert_eq!(tokens[1].metadata["index"], json!(1));
    }

    #[test]
    fn drops_empty_runs() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize_str("a  -  b", &Metadata::new());
        assert_eq!(texts(&tokens), vec!["a", "b"]);
    }

    #[test]
    fn numbers_use_their_display_form() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(&FieldValue::Number(5.0), &Metadata::new());
        assert_eq!(texts(&tokens), vec!["5"]);
    }

    #[test]
    fn lists_become_one_token_per_element() {
        let tokenizer = Tokenizer::default();
        let mut metadata = Metadata::new();
        metadata.insert("fields".to_string(), json!(["tags"]));

        let value = FieldValue::List(vec!["Alpha".to_string(), "Beta".to_string()]);
        let tokens = tokenizer.tokenize(&value, &metadata);

        assert_eq!(texts(&tokens), vec!["alpha", "beta"]);
        assert_eq!(tokens[0].metadata["fields"], json!(["tags"]));
    }

    #[test]
    fn merges_supplied_metadata_into_each_token() {
        let tokenizer = Tokenizer::default();
        let mut metadata = Metadata::new();
        metadata.insert("fields".to_string(), json!(["title"]));

        let tokens = tokenizer.tokenize_str("one two", &metadata);
        assert!(tokens.iter().all(|t| t.metadata["fields"] == json!(["title"])));
    }
}
