use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Metadata recorded about a term's occurrences in one document's field:
/// metadata key to the values gathered from each occurrence.
pub type OccurrenceMetadata = IndexMap<String, Vec<Value>>;

/// One field's slice of a posting: document ref to occurrence metadata.
pub type FieldPosting = IndexMap<String, OccurrenceMetadata>;

/// Inverted-index entry for a single term.
///
/// `index` is the term's dense ordinal in vector space; `fields` holds an
/// entry for every field known when the term was first seen, possibly empty.
/// Serializes to the wire shape `{"_index": n, "<field>": {...}, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(rename = "_index")]
    pub index: usize,
    #[serde(flatten)]
    pub fields: IndexMap<String, FieldPosting>,
}

impl Posting {
    pub fn new(index: usize, field_names: impl IntoIterator<Item = String>) -> Self {
        Posting {
            index,
            fields: field_names
                .into_iter()
                .map(|name| (name, FieldPosting::new()))
                .collect(),
        }
    }

    /// Number of (field, document) pairs the term appears in.
    pub fn document_frequency(&self) -> usize {
        self.fields.values().map(|field| field.len()).sum()
    }
}

/// term → posting, iterated in insertion order. Term ordinals form a
/// contiguous permutation of `0..len`.
pub type InvertedIndex = IndexMap<String, Posting>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_ordinal_beside_flattened_fields() {
        let mut posting = Posting::new(3, ["title".to_string(), "body".to_string()]);
        posting
            .fields
            .get_mut("title")
            .unwrap()
            .entry("doc-1".to_string())
            .or_default()
            .entry("position".to_string())
            .or_default()
            .push(json!([0, 3]));

        let value = serde_json::to_value(&posting).unwrap();
        assert_eq!(value["_index"], json!(3));
        assert_eq!(value["title"]["doc-1"]["position"], json!([[0, 3]]));
        assert_eq!(value["body"], json!({}));

        let back: Posting = serde_json::from_value(value).unwrap();
        assert_eq!(back, posting);
    }

    #[test]
    fn document_frequency_counts_field_document_pairs() {
        let mut posting = Posting::new(0, ["title".to_string(), "body".to_string()]);
        posting
            .fields
            .get_mut("title")
            .unwrap()
            .insert("a".to_string(), OccurrenceMetadata::new());
        posting
            .fields
            .get_mut("body")
            .unwrap()
            .insert("a".to_string(), OccurrenceMetadata::new());
        posting
            .fields
            .get_mut("body")
            .unwrap()
            .insert("b".to_string(), OccurrenceMetadata::new());

        assert_eq!(posting.document_frequency(), 3);
    }
}
