use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::fmt;
use crate::core::error::{Error, ErrorKind, Result};

/// Separator between the field name and document ref in a serialized FieldRef.
/// Field names must not contain it.
pub const JOINER: char = '/';

/// Composite key identifying one field of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub doc_ref: String,
    pub field_name: String,
}

impl FieldRef {
    pub fn new(doc_ref: impl Into<String>, field_name: impl Into<String>) -> Self {
        FieldRef {
            doc_ref: doc_ref.into(),
            field_name: field_name.into(),
        }
    }

    /// Parse the `fieldName/docRef` form. The doc ref may itself contain the
    /// joiner; only the first occurrence splits.
    pub fn from_str(s: &str) -> Result<FieldRef> {
        let n = s.find(JOINER).ok_or_else(|| {
            Error::new(
                ErrorKind::MalformedFieldRef,
                format!("malformed field ref string '{}'", s),
            )
        })?;

        Ok(FieldRef {
            field_name: s[..n].to_string(),
            doc_ref: s[n + 1..].to_string(),
        })
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}", self.field_name, JOINER, self.doc_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl FieldValue {
    /// String form used when the value identifies a document.
    pub fn as_ref_string(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::List(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub fields: HashMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            fields: HashMap::new(),
        }
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_ref_round_trips() {
        let field_ref = FieldRef::new("doc-1", "title");
        let parsed = FieldRef::from_str(&field_ref.to_string()).unwrap();
        assert_eq!(parsed, field_ref);
    }

    #[test]
    fn field_ref_doc_ref_may_contain_joiner() {
        let parsed = FieldRef::from_str("title/docs/123").unwrap();
        assert_eq!(parsed.field_name, "title");
        assert_eq!(parsed.doc_ref, "docs/123");
    }

    #[test]
    fn field_ref_without_joiner_is_malformed() {
        let err = FieldRef::from_str("title").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedFieldRef);
    }

    #[test]
    fn number_ref_string_matches_display_form() {
        assert_eq!(FieldValue::Number(5.0).as_ref_string().unwrap(), "5");
        assert_eq!(FieldValue::Number(5.5).as_ref_string().unwrap(), "5.5");
    }
}
