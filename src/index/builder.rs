use std::collections::HashMap;
use std::sync::Arc;
use indexmap::IndexMap;
use serde_json::json;
use tracing::debug;
use crate::analysis::filters::{register_defaults, PorterStemmer, StopWordFilter, Trimmer};
use crate::analysis::pipeline::Pipeline;
use crate::analysis::token::Metadata;
use crate::analysis::tokenizer::Tokenizer;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Document, FieldRef, FieldValue, JOINER};
use crate::index::inverted::{InvertedIndex, Posting};
use crate::index::number_map::NumberMap;
use crate::index::token_set::TokenSet;
use crate::schema::schema::{DocumentAttributes, FieldAttributes, FieldKind};
use crate::scoring::bm25::{inverse_document_frequency, Bm25Params};
use crate::scoring::vector::Vector;
use crate::search::index::Index;

/// Accumulates documents and materializes an immutable [`Index`].
///
/// Owns all build-time scratch state; `build` consumes the builder and moves
/// the finished structures into the index. A failure mid-`add` leaves the
/// builder inconsistent and it must be discarded.
#[derive(Debug)]
pub struct Builder {
    ref_field: String,
    fields: IndexMap<String, FieldAttributes>,
    documents: HashMap<String, DocumentAttributes>,
    inverted_index: InvertedIndex,
    // both maps are keyed by the serialized FieldRef string
    field_term_frequencies: IndexMap<String, HashMap<String, usize>>,
    field_lengths: HashMap<String, usize>,
    document_count: usize,
    term_index: usize,
    params: Bm25Params,
    pub tokenizer: Tokenizer,
    /// Stages applied to every token at indexing time.
    pub pipeline: Pipeline,
    /// Stages applied to query terms; moved into the index at `build`.
    pub search_pipeline: Pipeline,
    /// Token metadata keys recorded into the inverted index.
    pub metadata_whitelist: Vec<String>,
}

impl Builder {
    /// A builder with empty pipelines; documents are indexed verbatim.
    pub fn new() -> Self {
        Builder {
            ref_field: "id".to_string(),
            fields: IndexMap::new(),
            documents: HashMap::new(),
            inverted_index: InvertedIndex::new(),
            field_term_frequencies: IndexMap::new(),
            field_lengths: HashMap::new(),
            document_count: 0,
            term_index: 0,
            params: Bm25Params::default(),
            tokenizer: Tokenizer::default(),
            pipeline: Pipeline::new(),
            search_pipeline: Pipeline::new(),
            metadata_whitelist: Vec::new(),
        }
    }

    /// A builder wired with the default English pipelines: trimmer, stop-word
    /// filter and stemmer at indexing time, stemmer alone at search time.
    pub fn standard() -> Self {
        register_defaults();

        let mut builder = Builder::new();
        builder.pipeline.add(Arc::new(Trimmer));
        builder.pipeline.add(Arc::new(StopWordFilter::english()));
        builder.pipeline.add(Arc::new(PorterStemmer::new()));
        builder.search_pipeline.add(Arc::new(PorterStemmer::new()));
        builder
    }

    /// Name the field whose value identifies documents. Default `"id"`.
    pub fn reference(&mut self, name: &str) -> &mut Self {
        self.ref_field = name.to_string();
        self
    }

    /// Register a field to index. Field names must not contain the FieldRef
    /// joiner.
    pub fn field(&mut self, name: &str, attributes: FieldAttributes) -> Result<&mut Self> {
        if name.contains(JOINER) {
            return Err(Error::new(
                ErrorKind::IllegalFieldName,
                format!("field '{}' contains reserved character '{}'", name, JOINER),
            ));
        }

        self.fields.insert(name.to_string(), attributes);
        Ok(self)
    }

    /// Length-normalization strength, clamped to [0, 1].
    pub fn b(&mut self, b: f64) -> &mut Self {
        self.params.set_b(b);
        self
    }

    /// Term-frequency saturation parameter.
    pub fn k1(&mut self, k1: f64) -> &mut Self {
        self.params.set_k1(k1);
        self
    }

    /// Apply a plugin to this builder.
    pub fn use_plugin<F: FnOnce(&mut Builder)>(&mut self, plugin: F) -> &mut Self {
        plugin(self);
        self
    }

    /// Ingest one document: extract each registered field, tokenize, run the
    /// indexing pipeline, and fold the resulting terms into the inverted
    /// index and per-(document, field) statistics.
    pub fn add(&mut self, document: &Document, attributes: DocumentAttributes) -> Result<()> {
        let doc_ref = document
            .get_field(&self.ref_field)
            .and_then(FieldValue::as_ref_string)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidArgument,
                    format!("document is missing reference field '{}'", self.ref_field),
                )
            })?;

        self.documents.insert(doc_ref.clone(), attributes);
        self.document_count += 1;

        let fields: Vec<(String, FieldAttributes)> = self
            .fields
            .iter()
            .map(|(name, attributes)| (name.clone(), attributes.clone()))
            .collect();

        for (field_name, field_attributes) in fields {
            let value = match &field_attributes.extractor {
                Some(extractor) => extractor(document),
                None => document.get_field(&field_name).cloned(),
            };
            let Some(value) = value else {
                continue;
            };

            let kind = match field_attributes.kind {
                FieldKind::String => "string",
                FieldKind::Number => "number",
            };
            let mut metadata = Metadata::new();
            metadata.insert("fields".to_string(), json!([field_name]));
            metadata.insert("type".to_string(), json!(kind));

            let tokens = self.tokenizer.tokenize(&value, &metadata);
            let terms = self.pipeline.run(tokens);

            let field_ref = FieldRef::new(doc_ref.clone(), field_name.clone()).to_string();
            *self.field_lengths.entry(field_ref.clone()).or_insert(0) += terms.len();

            let frequencies = self.field_term_frequencies.entry(field_ref).or_default();

            for term in &terms {
                *frequencies.entry(term.text.clone()).or_insert(0) += 1;

                if !self.inverted_index.contains_key(&term.text) {
                    let posting = Posting::new(self.term_index, self.fields.keys().cloned());
                    self.term_index += 1;
                    self.inverted_index.insert(term.text.clone(), posting);
                }

                let Some(posting) = self.inverted_index.get_mut(&term.text) else {
                    continue;
                };
                let Some(field_posting) = posting.fields.get_mut(&field_name) else {
                    continue;
                };
                let occurrence = field_posting.entry(doc_ref.clone()).or_default();

                for key in &self.metadata_whitelist {
                    if let Some(value) = term.metadata.get(key) {
                        occurrence.entry(key.clone()).or_default().push(value.clone());
                    }
                }
            }
        }

        Ok(())
    }

    /// Materialize the index: average field lengths, BM25 field vectors, the
    /// vocabulary token set and the numeric value map.
    pub fn build(self) -> Result<Index> {
        let average_field_lengths = self.calculate_average_field_lengths()?;
        let field_vectors = self.create_field_vectors(&average_field_lengths)?;
        let token_set = self.create_token_set()?;
        let number_map = NumberMap::from_terms(self.inverted_index.keys().map(String::as_str));

        debug!(
            documents = self.document_count,
            terms = self.inverted_index.len(),
            fields = self.fields.len(),
            "built index"
        );

        let field_types = self
            .fields
            .iter()
            .map(|(name, attributes)| (name.clone(), attributes.kind))
            .collect();

        Ok(Index::new(
            self.inverted_index,
            field_vectors,
            token_set,
            self.fields.keys().cloned().collect(),
            field_types,
            number_map,
            self.search_pipeline,
        ))
    }

    fn calculate_average_field_lengths(&self) -> Result<HashMap<String, f64>> {
        let mut totals: HashMap<String, f64> = HashMap::new();
        let mut documents_with_field: HashMap<String, usize> = HashMap::new();

        for (field_ref_string, length) in &self.field_lengths {
            let field_ref = FieldRef::from_str(field_ref_string)?;
            *documents_with_field.entry(field_ref.field_name.clone()).or_insert(0) += 1;
            *totals.entry(field_ref.field_name).or_insert(0.0) += *length as f64;
        }

        for (field_name, total) in &mut totals {
            if let Some(&count) = documents_with_field.get(field_name) {
                *total /= count as f64;
            }
        }

        Ok(totals)
    }

    fn create_field_vectors(
        &self,
        average_field_lengths: &HashMap<String, f64>,
    ) -> Result<IndexMap<String, Vector>> {
        let mut field_vectors = IndexMap::with_capacity(self.field_term_frequencies.len());
        let mut idf_cache: HashMap<&str, f64> = HashMap::new();

        for (field_ref_string, term_frequencies) in &self.field_term_frequencies {
            let field_ref = FieldRef::from_str(field_ref_string)?;
            let field_name = field_ref.field_name;

            let field_boost = self
                .fields
                .get(&field_name)
                .map(|attributes| attributes.boost)
                .unwrap_or(1.0);
            let doc_boost = self
                .documents
                .get(&field_ref.doc_ref)
                .map(|attributes| attributes.boost)
                .unwrap_or(1.0);
            let field_length = self
                .field_lengths
                .get(field_ref_string)
                .copied()
                .unwrap_or_default() as f64;
            let average_field_length = average_field_lengths
                .get(&field_name)
                .copied()
                .unwrap_or_default();

            let mut vector = Vector::new();
            for (term, &term_frequency) in term_frequencies {
                let Some(posting) = self.inverted_index.get(term) else {
                    continue;
                };

                let idf = *idf_cache.entry(term.as_str()).or_insert_with(|| {
                    inverse_document_frequency(posting.document_frequency(), self.document_count)
                });

                let score = self.params.score(
                    idf,
                    term_frequency as f64,
                    field_length,
                    average_field_length,
                ) * field_boost
                    * doc_boost;
                let rounded = (score * 1000.0).round() / 1000.0;

                vector.insert(posting.index, rounded)?;
            }

            field_vectors.insert(field_ref_string.clone(), vector);
        }

        Ok(field_vectors)
    }

    fn create_token_set(&self) -> Result<TokenSet> {
        let mut terms: Vec<&str> = self.inverted_index.keys().map(String::as_str).collect();
        terms.sort_unstable();
        TokenSet::from_sorted_words(terms)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}
