use std::collections::{HashMap, HashSet};
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use serde_json::{json, Value};
use tracing::warn;
use crate::analysis::pipeline::Pipeline;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::FieldRef;
use crate::index::inverted::{InvertedIndex, Posting};
use crate::index::number_map::NumberMap;
use crate::index::token_set::TokenSet;
use crate::query::ast::{Clause, Presence, Query, QueryTerm};
use crate::query::parser::QueryParser;
use crate::schema::schema::FieldKind;
use crate::scoring::vector::Vector;
use crate::search::match_data::MatchData;
use crate::search::results::SearchResult;
use crate::search::set::DocSet;

/// Version stamped into serialized indexes; a mismatch on load warns but
/// does not fail.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// An immutable, queryable index over a document collection.
///
/// Produced by [`Builder::build`](crate::index::builder::Builder::build) or
/// [`Index::load`]; holds the inverted index, per-(document, field) BM25
/// vectors, the vocabulary token set and the numeric value map.
pub struct Index {
    pub(crate) inverted_index: InvertedIndex,
    pub(crate) field_vectors: IndexMap<String, Vector>,
    pub(crate) token_set: TokenSet,
    pub(crate) fields: Vec<String>,
    pub(crate) field_types: HashMap<String, FieldKind>,
    pub(crate) number_map: NumberMap,
    // the search-time pipeline; query clause terms run through it
    pub(crate) pipeline: Pipeline,
}

impl Index {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        inverted_index: InvertedIndex,
        field_vectors: IndexMap<String, Vector>,
        token_set: TokenSet,
        fields: Vec<String>,
        field_types: HashMap<String, FieldKind>,
        number_map: NumberMap,
        pipeline: Pipeline,
    ) -> Self {
        Index {
            inverted_index,
            field_vectors,
            token_set,
            fields,
            field_types,
            number_map,
            pipeline,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn term_count(&self) -> usize {
        self.inverted_index.len()
    }

    /// Parse and execute a query-language string.
    pub fn search(&self, query_string: &str) -> Result<Vec<SearchResult>> {
        let mut query = self.create_query();
        QueryParser::new(query_string, &mut query).parse()?;
        self.execute(&query)
    }

    /// Execute a programmatically built query; the closure receives a fresh
    /// [`Query`] scoped to this index's fields.
    pub fn query<F: FnOnce(&mut Query)>(&self, build: F) -> Result<Vec<SearchResult>> {
        let mut query = self.create_query();
        build(&mut query);
        self.execute(&query)
    }

    fn create_query(&self) -> Query {
        Query::new(self.fields.clone(), self.field_types.clone())
    }

    fn execute(&self, query: &Query) -> Result<Vec<SearchResult>> {
        for clause in &query.clauses {
            for field in &clause.fields {
                if !self.fields.iter().any(|f| f == field) {
                    return Err(Error::new(
                        ErrorKind::InvalidArgument,
                        format!("clause references unknown field '{}'", field),
                    ));
                }
            }
        }

        let mut query_vectors: HashMap<&str, Vector> = self
            .fields
            .iter()
            .map(|field| (field.as_str(), Vector::new()))
            .collect();
        let mut matching_fields: IndexMap<String, MatchData> = IndexMap::new();
        let mut term_field_cache: HashSet<(String, String)> = HashSet::new();
        let mut required_matches: HashMap<String, DocSet> = HashMap::new();
        let mut prohibited_matches: HashMap<String, DocSet> = HashMap::new();

        for clause in &query.clauses {
            // the clause's effective terms: the search pipeline may expand or
            // drop plain string terms
            let terms: Vec<QueryTerm> = match &clause.term {
                QueryTerm::String(term) if clause.use_pipeline => {
                    let metadata =
                        [("fields".to_string(), json!(clause.fields))].into_iter().collect();
                    self.pipeline
                        .run_string(term, metadata)
                        .into_iter()
                        .map(QueryTerm::String)
                        .collect()
                }
                other => vec![other.clone()],
            };

            // matches accumulated across this clause's terms and fields;
            // "required" means required in at least one of them
            let mut clause_matches = DocSet::Empty;

            for term in &terms {
                let term_token_set = self.token_set_for(term, clause)?;
                let expanded_terms = term_token_set.intersect(&self.token_set).to_vec();

                // a required term with no expansion can never be satisfied
                if expanded_terms.is_empty() && clause.presence == Presence::Required {
                    for field in &clause.fields {
                        required_matches.insert(field.clone(), DocSet::Empty);
                    }
                    break;
                }

                for expanded_term in &expanded_terms {
                    let Some(posting) = self.inverted_index.get(expanded_term) else {
                        continue;
                    };
                    let term_index = posting.index;

                    for field in &clause.fields {
                        let Some(field_posting) = posting.fields.get(field) else {
                            continue;
                        };
                        let matching_docs =
                            DocSet::from_keys(field_posting.keys().cloned());

                        if clause.presence == Presence::Required {
                            clause_matches = clause_matches.union(&matching_docs);
                            required_matches
                                .entry(field.clone())
                                .or_insert(DocSet::Complete);
                        }

                        if clause.presence == Presence::Prohibited {
                            let entry = prohibited_matches
                                .entry(field.clone())
                                .or_insert(DocSet::Empty);
                            *entry = entry.union(&matching_docs);
                            // prohibited matches never contribute to scoring
                            continue;
                        }

                        if let Some(query_vector) = query_vectors.get_mut(field.as_str()) {
                            query_vector.upsert(term_index, clause.boost, |a, b| a + b);
                        }

                        // one metadata contribution per (term, field), however
                        // many clauses expand to it
                        let cache_key = (expanded_term.clone(), field.clone());
                        if term_field_cache.contains(&cache_key) {
                            continue;
                        }

                        for (doc_ref, metadata) in field_posting {
                            let field_ref =
                                FieldRef::new(doc_ref.as_str(), field.as_str()).to_string();
                            match matching_fields.get_mut(&field_ref) {
                                Some(existing) => existing.add(expanded_term, field, metadata),
                                None => {
                                    matching_fields.insert(
                                        field_ref,
                                        MatchData::with(expanded_term, field, metadata),
                                    );
                                }
                            }
                        }

                        term_field_cache.insert(cache_key);
                    }
                }
            }

            if clause.presence == Presence::Required {
                for field in &clause.fields {
                    let entry = required_matches
                        .entry(field.clone())
                        .or_insert(DocSet::Complete);
                    *entry = entry.intersect(&clause_matches);
                }
            }
        }

        let mut all_required = DocSet::Complete;
        let mut all_prohibited = DocSet::Empty;
        for field in &self.fields {
            if let Some(required) = required_matches.get(field) {
                all_required = all_required.intersect(required);
            }
            if let Some(prohibited) = prohibited_matches.get(field) {
                all_prohibited = all_prohibited.union(prohibited);
            }
        }

        let mut matching_field_refs: Vec<String> = matching_fields.keys().cloned().collect();

        // a fully negated query considers every indexed field so that
        // unmatched documents surface with score 0
        if query.is_negated() {
            matching_field_refs = self.field_vectors.keys().cloned().collect();
            for field_ref in &matching_field_refs {
                matching_fields.insert(field_ref.clone(), MatchData::new());
            }
        }

        let mut results: Vec<SearchResult> = Vec::new();
        let mut result_positions: HashMap<String, usize> = HashMap::new();

        for field_ref_string in &matching_field_refs {
            let field_ref = FieldRef::from_str(field_ref_string)?;
            let doc_ref = field_ref.doc_ref;

            if !all_required.contains(&doc_ref) || all_prohibited.contains(&doc_ref) {
                continue;
            }

            let Some(field_vector) = self.field_vectors.get(field_ref_string) else {
                continue;
            };
            let score = query_vectors
                .get(field_ref.field_name.as_str())
                .map(|query_vector| query_vector.similarity(field_vector))
                .unwrap_or(0.0);

            let match_data = matching_fields
                .get(field_ref_string)
                .cloned()
                .unwrap_or_default();

            match result_positions.get(&doc_ref) {
                Some(&position) => {
                    results[position].score += score;
                    results[position].match_data.combine(&match_data);
                }
                None => {
                    result_positions.insert(doc_ref.clone(), results.len());
                    results.push(SearchResult {
                        doc_ref,
                        score,
                        match_data,
                    });
                }
            }
        }

        // stable sort keeps first-encountered order for equal scores
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(results)
    }

    fn token_set_for(&self, term: &QueryTerm, clause: &Clause) -> Result<TokenSet> {
        match term {
            QueryTerm::String(s) => {
                if clause.edit_distance > 0 {
                    Ok(TokenSet::from_fuzzy_string(s, clause.edit_distance))
                } else {
                    Ok(TokenSet::from_string(s))
                }
            }
            QueryTerm::Comparator {
                comparator,
                comparand,
            } => self.number_map.match_comparator(*comparator, *comparand),
            QueryTerm::Range { start, end } => self.number_map.match_range(*start, *end),
        }
    }

    /// Structural JSON form: `{version, fields, fieldTypes, fieldVectors,
    /// invertedIndex, pipeline}` with the inverted index sorted by term.
    pub fn to_json(&self) -> Result<Value> {
        let mut inverted_index: Vec<(&String, &Posting)> = self.inverted_index.iter().collect();
        inverted_index.sort_by(|a, b| a.0.cmp(b.0));

        let serialized = SerializedIndex {
            version: VERSION.to_string(),
            fields: self.fields.clone(),
            field_types: self
                .fields
                .iter()
                .map(|field| {
                    (
                        field.clone(),
                        self.field_types.get(field).copied().unwrap_or_default(),
                    )
                })
                .collect(),
            field_vectors: self
                .field_vectors
                .iter()
                .map(|(field_ref, vector)| (field_ref.clone(), vector.to_flat()))
                .collect(),
            inverted_index: inverted_index
                .into_iter()
                .map(|(term, posting)| (term.clone(), posting.clone()))
                .collect(),
            pipeline: self.pipeline.to_json(),
        };

        serde_json::to_value(&serialized)
            .map_err(|e| Error::new(ErrorKind::Serialization, e.to_string()))
    }

    /// Rebuild an index from its serialized form. A version mismatch logs a
    /// warning; unregistered pipeline labels are fatal.
    pub fn load(serialized: Value) -> Result<Index> {
        let serialized: SerializedIndex = serde_json::from_value(serialized)
            .map_err(|e| Error::new(ErrorKind::Serialization, e.to_string()))?;

        if serialized.version != VERSION {
            warn!(
                expected = VERSION,
                found = %serialized.version,
                "version mismatch when loading serialized index"
            );
        }

        let pipeline = Pipeline::load(&serialized.pipeline)?;

        let field_vectors: IndexMap<String, Vector> = serialized
            .field_vectors
            .into_iter()
            .map(|(field_ref, flat)| (field_ref, Vector::from_flat(&flat)))
            .collect();

        let inverted_index: InvertedIndex = serialized.inverted_index.into_iter().collect();

        let mut terms: Vec<&str> = inverted_index.keys().map(String::as_str).collect();
        terms.sort_unstable();
        let token_set = TokenSet::from_sorted_words(&terms)?;
        let number_map = NumberMap::from_terms(terms.iter().copied());

        Ok(Index {
            inverted_index,
            field_vectors,
            token_set,
            fields: serialized.fields,
            field_types: serialized.field_types.into_iter().collect(),
            number_map,
            pipeline,
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedIndex {
    version: String,
    fields: Vec<String>,
    field_types: IndexMap<String, FieldKind>,
    field_vectors: Vec<(String, Vec<f64>)>,
    inverted_index: Vec<(String, Posting)>,
    pipeline: Vec<String>,
}
