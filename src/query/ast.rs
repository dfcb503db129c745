use std::collections::HashMap;
use std::ops::BitOr;
use crate::index::number_map::{Comparator, RangeBound};
use crate::schema::schema::FieldKind;

/// A clause's effect on candidate documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    /// Contributes to scoring only.
    #[default]
    Optional,
    /// Matching documents are intersected into the result set.
    Required,
    /// Matching documents are subtracted from the result set.
    Prohibited,
}

/// Wildcard positions automatically applied to a clause term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wildcard(u8);

impl Wildcard {
    pub const NONE: Wildcard = Wildcard(0);
    pub const LEADING: Wildcard = Wildcard(1);
    pub const TRAILING: Wildcard = Wildcard(2);

    pub fn has_leading(self) -> bool {
        self.0 & Wildcard::LEADING.0 != 0
    }

    pub fn has_trailing(self) -> bool {
        self.0 & Wildcard::TRAILING.0 != 0
    }
}

impl BitOr for Wildcard {
    type Output = Wildcard;

    fn bitor(self, rhs: Wildcard) -> Wildcard {
        Wildcard(self.0 | rhs.0)
    }
}

/// A clause term: a plain string, a comparison, or a numeric range.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTerm {
    String(String),
    Comparator {
        comparator: Comparator,
        comparand: f64,
    },
    Range {
        start: RangeBound,
        end: RangeBound,
    },
}

/// One atomic matching unit of a query.
#[derive(Debug, Clone)]
pub struct Clause {
    /// Fields the clause applies to; defaulted by [`Query::clause`] when empty.
    pub fields: Vec<String>,
    pub term: QueryTerm,
    pub boost: f64,
    pub edit_distance: usize,
    pub use_pipeline: bool,
    pub wildcard: Wildcard,
    pub presence: Presence,
}

impl Clause {
    pub fn new(term: QueryTerm) -> Self {
        Clause {
            fields: Vec::new(),
            term,
            boost: 1.0,
            edit_distance: 0,
            use_pipeline: true,
            wildcard: Wildcard::NONE,
            presence: Presence::Optional,
        }
    }
}

/// Options accepted by the clause-building helpers on [`Query`].
#[derive(Debug, Clone, Default)]
pub struct ClauseOptions {
    pub fields: Option<Vec<String>>,
    pub boost: Option<f64>,
    pub edit_distance: Option<usize>,
    pub use_pipeline: Option<bool>,
    pub wildcard: Wildcard,
    pub presence: Option<Presence>,
}

impl ClauseOptions {
    fn apply(self, mut clause: Clause) -> Clause {
        if let Some(fields) = self.fields {
            clause.fields = fields;
        }
        if let Some(boost) = self.boost {
            clause.boost = boost;
        }
        if let Some(edit_distance) = self.edit_distance {
            clause.edit_distance = edit_distance;
        }
        if let Some(use_pipeline) = self.use_pipeline {
            clause.use_pipeline = use_pipeline;
        }
        clause.wildcard = self.wildcard;
        if let Some(presence) = self.presence {
            clause.presence = presence;
        }
        clause
    }
}

/// A programmatic query: an ordered list of clauses scoped to the fields of
/// the index that created it. Built either through the helpers here or by the
/// query-language parser.
#[derive(Debug, Clone)]
pub struct Query {
    pub clauses: Vec<Clause>,
    pub all_fields: Vec<String>,
    pub field_types: HashMap<String, FieldKind>,
}

impl Query {
    pub fn new(all_fields: Vec<String>, field_types: HashMap<String, FieldKind>) -> Self {
        Query {
            clauses: Vec::new(),
            all_fields,
            field_types,
        }
    }

    /// Append a clause, filling defaults: empty fields become every index
    /// field (numeric fields only for range/comparator terms) and wildcard
    /// flags splice `*` into string terms when absent.
    pub fn clause(&mut self, mut clause: Clause) -> &mut Self {
        if clause.fields.is_empty() {
            clause.fields = match clause.term {
                QueryTerm::String(_) => self.all_fields.clone(),
                _ => self.numeric_fields(),
            };
        }

        if let QueryTerm::String(ref mut term) = clause.term {
            if clause.wildcard.has_leading() && !term.starts_with('*') {
                term.insert(0, '*');
            }
            if clause.wildcard.has_trailing() && !term.ends_with('*') {
                term.push('*');
            }
        }

        self.clauses.push(clause);
        self
    }

    /// Add a single term clause. The term is used verbatim; the parser, not
    /// this method, is responsible for lowercasing user input.
    pub fn term(&mut self, term: &str, options: ClauseOptions) -> &mut Self {
        let clause = options.apply(Clause::new(QueryTerm::String(term.to_string())));
        self.clause(clause)
    }

    /// Add one clause per term, all sharing the same options.
    pub fn terms(&mut self, terms: &[&str], options: ClauseOptions) -> &mut Self {
        for term in terms {
            self.term(term, options.clone());
        }
        self
    }

    /// Add a comparison clause over numeric fields.
    pub fn comparator(
        &mut self,
        comparator: Comparator,
        comparand: f64,
        options: ClauseOptions,
    ) -> &mut Self {
        let clause = options.apply(Clause::new(QueryTerm::Comparator {
            comparator,
            comparand,
        }));
        self.clause(clause)
    }

    /// Add a numeric range clause; both endpoints are inclusive and
    /// [`RangeBound::Unbounded`] opens an end.
    pub fn range(
        &mut self,
        start: impl Into<RangeBound>,
        end: impl Into<RangeBound>,
        options: ClauseOptions,
    ) -> &mut Self {
        let clause = options.apply(Clause::new(QueryTerm::Range {
            start: start.into(),
            end: end.into(),
        }));
        self.clause(clause)
    }

    /// True when every clause is prohibited; such a query matches every
    /// document that no clause excludes, all with score 0.
    pub fn is_negated(&self) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.presence == Presence::Prohibited)
    }

    fn numeric_fields(&self) -> Vec<String> {
        self.all_fields
            .iter()
            .filter(|field| self.field_types.get(*field) == Some(&FieldKind::Number))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query {
        let mut field_types = HashMap::new();
        field_types.insert("title".to_string(), FieldKind::String);
        field_types.insert("word_count".to_string(), FieldKind::Number);
        Query::new(
            vec!["title".to_string(), "word_count".to_string()],
            field_types,
        )
    }

    #[test]
    fn string_clauses_default_to_all_fields() {
        let mut q = query();
        q.term("cat", ClauseOptions::default());
        assert_eq!(q.clauses[0].fields, vec!["title", "word_count"]);
    }

    #[test]
    fn numeric_clauses_default_to_numeric_fields() {
        let mut q = query();
        q.range(1.0, 5.0, ClauseOptions::default());
        assert_eq!(q.clauses[0].fields, vec!["word_count"]);
    }

    #[test]
    fn explicit_fields_are_kept() {
        let mut q = query();
        q.term(
            "cat",
            ClauseOptions {
                fields: Some(vec!["title".to_string()]),
                ..Default::default()
            },
        );
        assert_eq!(q.clauses[0].fields, vec!["title"]);
    }

    #[test]
    fn wildcard_flags_splice_stars() {
        let mut q = query();
        q.term(
            "cat",
            ClauseOptions {
                wildcard: Wildcard::LEADING | Wildcard::TRAILING,
                ..Default::default()
            },
        );
        assert_eq!(q.clauses[0].term, QueryTerm::String("*cat*".to_string()));
    }

    #[test]
    fn wildcard_flags_do_not_duplicate_existing_stars() {
        let mut q = query();
        q.term(
            "*cat*",
            ClauseOptions {
                wildcard: Wildcard::LEADING | Wildcard::TRAILING,
                ..Default::default()
            },
        );
        assert_eq!(q.clauses[0].term, QueryTerm::String("*cat*".to_string()));
    }

    #[test]
    fn negated_only_when_every_clause_is_prohibited() {
        let mut q = query();
        q.term(
            "cat",
            ClauseOptions {
                presence: Some(Presence::Prohibited),
                ..Default::default()
            },
        );
        assert!(q.is_negated());

        q.term("dog", ClauseOptions::default());
        assert!(!q.is_negated());
    }

    #[test]
    fn empty_query_counts_as_negated() {
        assert!(query().is_negated());
    }
}
