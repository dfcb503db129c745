use crate::core::error::{Error, Result};
use crate::index::number_map::{Comparator, RangeBound};
use crate::query::ast::{Clause, Presence, Query, QueryTerm};
use crate::query::lexer::{Lexeme, LexemeKind, QueryLexer};
use crate::schema::schema::FieldKind;

enum State {
    Clause,
    Presence,
    Field,
    Term,
    EditDistance,
    Boost,
    RangeStart,
    RangeEnd,
    Comparator,
    Comparand,
}

/// Clause under construction; committed when the next clause boundary is
/// reached.
#[derive(Default)]
struct PendingClause {
    fields: Option<Vec<String>>,
    term: Option<QueryTerm>,
    comparator: Option<Comparator>,
    range_start: Option<RangeBound>,
    boost: Option<f64>,
    edit_distance: Option<usize>,
    use_pipeline: Option<bool>,
    presence: Option<Presence>,
}

/// Compiles a query string into clauses on a [`Query`], one state function
/// per lexeme kind.
pub struct QueryParser<'a> {
    lexemes: Vec<Lexeme>,
    position: usize,
    query: &'a mut Query,
    pending: PendingClause,
}

impl<'a> QueryParser<'a> {
    pub fn new(query_string: &str, query: &'a mut Query) -> Self {
        QueryParser {
            lexemes: QueryLexer::new(query_string).run(),
            position: 0,
            query,
            pending: PendingClause::default(),
        }
    }

    pub fn parse(mut self) -> Result<()> {
        let mut state = Some(State::Clause);
        while let Some(current) = state {
            state = match current {
                State::Clause => self.parse_clause()?,
                State::Presence => self.parse_presence()?,
                State::Field => self.parse_field()?,
                State::Term => self.parse_term()?,
                State::EditDistance => self.parse_edit_distance()?,
                State::Boost => self.parse_boost()?,
                State::RangeStart => self.parse_range_start()?,
                State::RangeEnd => self.parse_range_end()?,
                State::Comparator => self.parse_comparator()?,
                State::Comparand => self.parse_comparand()?,
            };
        }
        Ok(())
    }

    fn parse_clause(&mut self) -> Result<Option<State>> {
        match self.peek().kind {
            LexemeKind::Presence => Ok(Some(State::Presence)),
            LexemeKind::Field => Ok(Some(State::Field)),
            LexemeKind::Term => Ok(Some(State::Term)),
            LexemeKind::RangeStart => Ok(Some(State::RangeStart)),
            LexemeKind::Eos => Ok(None),
            _ => Err(self.error_at("expected either a field or a term")),
        }
    }

    fn parse_presence(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        self.pending.presence = match lexeme.value.as_str() {
            "-" => Some(Presence::Prohibited),
            "+" => Some(Presence::Required),
            _ => {
                return Err(Self::error_for(
                    format!("unrecognised presence operator '{}'", lexeme.value),
                    &lexeme,
                ))
            }
        };

        match self.peek().kind {
            LexemeKind::Field => Ok(Some(State::Field)),
            LexemeKind::Term => Ok(Some(State::Term)),
            LexemeKind::RangeStart => Ok(Some(State::RangeStart)),
            LexemeKind::Eos => Err(self.error_at("expecting term or field, found nothing")),
            _ => Err(self.error_at("expecting term or field")),
        }
    }

    fn parse_field(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();

        if !self.query.all_fields.iter().any(|f| f == &lexeme.value) {
            return Err(Self::error_for(
                format!(
                    "unrecognised field '{}', possible fields: {}",
                    lexeme.value,
                    self.query.all_fields.join(", ")
                ),
                &lexeme,
            ));
        }

        let numeric = self.query.field_types.get(&lexeme.value) == Some(&FieldKind::Number);
        self.pending.fields = Some(vec![lexeme.value.clone()]);

        match self.peek().kind {
            LexemeKind::Term => Ok(Some(State::Term)),
            LexemeKind::RangeStart | LexemeKind::Comparator if !numeric => Err(Self::error_for(
                format!(
                    "field '{}' is not numeric and does not support range or comparator clauses",
                    lexeme.value
                ),
                &lexeme,
            )),
            LexemeKind::RangeStart => Ok(Some(State::RangeStart)),
            LexemeKind::Comparator => Ok(Some(State::Comparator)),
            LexemeKind::Eos => Err(self.error_at("expecting term, found nothing")),
            _ => Err(self.error_at("expecting term")),
        }
    }

    fn parse_term(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        let term = lexeme.value.to_lowercase();

        if term.contains('*') {
            self.pending.use_pipeline = Some(false);
        }
        self.pending.term = Some(QueryTerm::String(term));

        self.after_term()
    }

    fn parse_edit_distance(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        let edit_distance = lexeme
            .value
            .parse::<usize>()
            .map_err(|_| Self::error_for("edit distance must be numeric", &lexeme))?;

        self.pending.edit_distance = Some(edit_distance);
        self.after_term()
    }

    fn parse_boost(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        let boost = lexeme
            .value
            .parse::<usize>()
            .map_err(|_| Self::error_for("boost must be numeric", &lexeme))?;

        self.pending.boost = Some(boost as f64);
        self.after_term()
    }

    fn parse_range_start(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        self.pending.range_start = Some(Self::parse_bound(&lexeme)?);

        match self.peek().kind {
            LexemeKind::RangeEnd => Ok(Some(State::RangeEnd)),
            _ => Err(self.error_at("expecting range end")),
        }
    }

    fn parse_range_end(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        let end = Self::parse_bound(&lexeme)?;
        let start = self.pending.range_start.take().unwrap_or(RangeBound::Unbounded);

        self.pending.term = Some(QueryTerm::Range { start, end });
        self.after_term()
    }

    fn parse_comparator(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        self.pending.comparator = Some(match lexeme.value.as_str() {
            ">" => Comparator::GreaterThan,
            ">=" => Comparator::GreaterThanOrEqual,
            "<" => Comparator::LessThan,
            "<=" => Comparator::LessThanOrEqual,
            _ => {
                return Err(Self::error_for(
                    format!("unrecognised comparator '{}'", lexeme.value),
                    &lexeme,
                ))
            }
        });

        match self.peek().kind {
            LexemeKind::Comparand => Ok(Some(State::Comparand)),
            _ => Err(self.error_at("expecting comparand")),
        }
    }

    fn parse_comparand(&mut self) -> Result<Option<State>> {
        let lexeme = self.consume();
        let comparand = lexeme
            .value
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| Self::error_for("comparand must be numeric", &lexeme))?;
        let comparator = self
            .pending
            .comparator
            .take()
            .unwrap_or(Comparator::GreaterThanOrEqual);

        self.pending.term = Some(QueryTerm::Comparator {
            comparator,
            comparand,
        });
        self.after_term()
    }

    /// Dispatch after a complete term: modifiers extend the pending clause,
    /// anything else commits it and starts the next one.
    fn after_term(&mut self) -> Result<Option<State>> {
        match self.peek().kind {
            LexemeKind::EditDistance => Ok(Some(State::EditDistance)),
            LexemeKind::Boost => Ok(Some(State::Boost)),
            LexemeKind::Term => {
                self.next_clause();
                Ok(Some(State::Term))
            }
            LexemeKind::Field => {
                self.next_clause();
                Ok(Some(State::Field))
            }
            LexemeKind::Presence => {
                self.next_clause();
                Ok(Some(State::Presence))
            }
            LexemeKind::RangeStart => {
                self.next_clause();
                Ok(Some(State::RangeStart))
            }
            LexemeKind::Eos => {
                self.next_clause();
                Ok(None)
            }
            _ => Err(self.error_at("unexpected lexeme")),
        }
    }

    fn next_clause(&mut self) {
        let pending = std::mem::take(&mut self.pending);

        if let Some(term) = pending.term {
            let mut clause = Clause::new(term);
            if let Some(fields) = pending.fields {
                clause.fields = fields;
            }
            if let Some(boost) = pending.boost {
                clause.boost = boost;
            }
            if let Some(edit_distance) = pending.edit_distance {
                clause.edit_distance = edit_distance;
            }
            if let Some(use_pipeline) = pending.use_pipeline {
                clause.use_pipeline = use_pipeline;
            }
            if let Some(presence) = pending.presence {
                clause.presence = presence;
            }
            self.query.clause(clause);
        }
    }

    fn parse_bound(lexeme: &Lexeme) -> Result<RangeBound> {
        if lexeme.value == "*" {
            return Ok(RangeBound::Unbounded);
        }

        lexeme
            .value
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(RangeBound::Value)
            .ok_or_else(|| Self::error_for("range endpoint must be numeric or '*'", lexeme))
    }

    fn peek(&self) -> &Lexeme {
        // the lexer always terminates the stream with an EOS lexeme
        &self.lexemes[self.position.min(self.lexemes.len() - 1)]
    }

    fn consume(&mut self) -> Lexeme {
        let lexeme = self.peek().clone();
        self.position += 1;
        lexeme
    }

    fn error_at(&self, message: impl Into<String>) -> Error {
        Self::error_for(message, self.peek())
    }

    fn error_for(message: impl Into<String>, lexeme: &Lexeme) -> Error {
        Error::query_parse(message, lexeme.start, lexeme.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use std::collections::HashMap;

    fn parse(query_string: &str) -> Result<Query> {
        let mut field_types = HashMap::new();
        field_types.insert("title".to_string(), FieldKind::String);
        field_types.insert("body".to_string(), FieldKind::String);
        field_types.insert("word_count".to_string(), FieldKind::Number);

        let mut query = Query::new(
            vec![
                "title".to_string(),
                "body".to_string(),
                "word_count".to_string(),
            ],
            field_types,
        );
        QueryParser::new(query_string, &mut query).parse()?;
        Ok(query)
    }

    #[test]
    fn single_term_clause() {
        let query = parse("cat").unwrap();
        assert_eq!(query.clauses.len(), 1);
        assert_eq!(query.clauses[0].term, QueryTerm::String("cat".to_string()));
        assert_eq!(
            query.clauses[0].fields,
            vec!["title", "body", "word_count"]
        );
    }

    #[test]
    fn terms_are_lowercased() {
        let query = parse("CAT").unwrap();
        assert_eq!(query.clauses[0].term, QueryTerm::String("cat".to_string()));
    }

    #[test]
    fn successive_terms_start_new_clauses() {
        let query = parse("green eggs ham").unwrap();
        assert_eq!(query.clauses.len(), 3);
    }

    #[test]
    fn field_scopes_the_following_term() {
        let query = parse("title:cat").unwrap();
        assert_eq!(query.clauses[0].fields, vec!["title"]);
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = parse("author:cat").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::QueryParse { start: 0, end: 6 }));
        assert!(err.context.contains("unrecognised field"));
    }

    #[test]
    fn presence_markers_set_clause_presence() {
        let query = parse("+cat -hat dog").unwrap();
        assert_eq!(query.clauses[0].presence, Presence::Required);
        assert_eq!(query.clauses[1].presence, Presence::Prohibited);
        assert_eq!(query.clauses[2].presence, Presence::Optional);
    }

    #[test]
    fn trailing_presence_marker_is_an_error() {
        let err = parse("cat +").unwrap_err();
        assert!(err.context.contains("expecting term or field"));
    }

    #[test]
    fn edit_distance_and_boost_modify_the_clause() {
        let query = parse("cat~2^10").unwrap();
        assert_eq!(query.clauses[0].edit_distance, 2);
        assert_eq!(query.clauses[0].boost, 10.0);
    }

    #[test]
    fn non_numeric_edit_distance_is_an_error() {
        let err = parse("cat~x").unwrap_err();
        assert!(err.context.contains("edit distance must be numeric"));
    }

    #[test]
    fn non_numeric_boost_is_an_error() {
        let err = parse("cat^x").unwrap_err();
        assert!(err.context.contains("boost must be numeric"));
    }

    #[test]
    fn wildcard_terms_disable_the_pipeline() {
        let query = parse("tre*").unwrap();
        assert!(!query.clauses[0].use_pipeline);
        assert_eq!(query.clauses[0].term, QueryTerm::String("tre*".to_string()));

        let query = parse("tree").unwrap();
        assert!(query.clauses[0].use_pipeline);
    }

    #[test]
    fn bare_range_targets_numeric_fields() {
        let query = parse("5..10").unwrap();
        assert_eq!(query.clauses[0].fields, vec!["word_count"]);
        assert_eq!(
            query.clauses[0].term,
            QueryTerm::Range {
                start: RangeBound::Value(5.0),
                end: RangeBound::Value(10.0),
            }
        );
    }

    #[test]
    fn open_ended_range() {
        let query = parse("word_count:*..10").unwrap();
        assert_eq!(
            query.clauses[0].term,
            QueryTerm::Range {
                start: RangeBound::Unbounded,
                end: RangeBound::Value(10.0),
            }
        );
    }

    #[test]
    fn range_on_string_field_is_an_error() {
        let err = parse("title:1..5").unwrap_err();
        assert!(err.context.contains("not numeric"));
    }

    #[test]
    fn comparator_clause() {
        let query = parse("word_count:>=5").unwrap();
        assert_eq!(
            query.clauses[0].term,
            QueryTerm::Comparator {
                comparator: Comparator::GreaterThanOrEqual,
                comparand: 5.0,
            }
        );
        assert_eq!(query.clauses[0].fields, vec!["word_count"]);
    }

    #[test]
    fn comparator_on_string_field_is_an_error() {
        let err = parse("title:>5").unwrap_err();
        assert!(err.context.contains("not numeric"));
    }

    #[test]
    fn malformed_range_endpoint_is_an_error() {
        let err = parse("word_count:a..b").unwrap_err();
        assert!(err.context.contains("range endpoint"));
    }

    #[test]
    fn empty_query_has_no_clauses() {
        let query = parse("").unwrap();
        assert!(query.clauses.is_empty());
    }

    #[test]
    fn escaped_special_characters_stay_in_the_term() {
        let query = parse(r"foo\:bar").unwrap();
        assert_eq!(
            query.clauses[0].term,
            QueryTerm::String("foo:bar".to_string())
        );
    }

    #[test]
    fn parse_error_offsets_point_into_the_source() {
        let err = parse("cat author:dog").unwrap_err();
        match err.kind {
            ErrorKind::QueryParse { start, end } => {
                assert_eq!(start, 4);
                assert_eq!(end, 10);
            }
            other => panic!("unexpected error kind {:?}", other),
        }
    }
}
