use indexmap::IndexMap;
use serde_json::Value;
use crate::index::inverted::OccurrenceMetadata;

/// Match metadata aggregated for one result: term → field → metadata key →
/// collected values. Every level preserves insertion order; values collected
/// for the same key are concatenated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchData {
    pub metadata: IndexMap<String, IndexMap<String, IndexMap<String, Vec<Value>>>>,
}

impl MatchData {
    pub fn new() -> Self {
        MatchData::default()
    }

    /// Seed with the metadata of one (term, field) match.
    pub fn with(term: &str, field: &str, metadata: &OccurrenceMetadata) -> Self {
        let mut match_data = MatchData::new();
        match_data.add(term, field, metadata);
        match_data
    }

    /// Record another match for `term` in `field`, concatenating values per
    /// metadata key.
    pub fn add(&mut self, term: &str, field: &str, metadata: &OccurrenceMetadata) {
        let keys = self
            .metadata
            .entry(term.to_string())
            .or_default()
            .entry(field.to_string())
            .or_default();

        for (key, values) in metadata {
            keys.entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    /// Merge another aggregate into this one, deeply, concatenating value
    /// arrays at the leaves.
    pub fn combine(&mut self, other: &MatchData) {
        for (term, fields) in &other.metadata {
            let term_entry = self.metadata.entry(term.clone()).or_default();
            for (field, keys) in fields {
                let field_entry = term_entry.entry(field.clone()).or_default();
                for (key, values) in keys {
                    field_entry
                        .entry(key.clone())
                        .or_default()
                        .extend(values.iter().cloned());
                }
            }
        }
    }
}
