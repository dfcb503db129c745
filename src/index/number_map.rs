use crate::core::error::Result;
use crate::index::token_set::TokenSet;

/// Comparison operator accepted by numeric clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

/// One endpoint of a numeric range; `Unbounded` is the `*` endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeBound {
    Unbounded,
    Value(f64),
}

impl From<f64> for RangeBound {
    fn from(value: f64) -> Self {
        RangeBound::Value(value)
    }
}

/// Sorted mapping from numeric values to the index terms that produced them.
///
/// A term is numeric iff its surface form parses as a finite number, so the
/// map can always be rebuilt from the inverted index alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberMap {
    entries: Vec<NumberMapEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberMapEntry {
    pub value: f64,
    pub tokens: Vec<String>,
}

impl NumberMap {
    /// Collect every term that parses as a finite number, grouped by value,
    /// ascending.
    pub fn from_terms<'a, I>(terms: I) -> NumberMap
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut parsed: Vec<(f64, &str)> = terms
            .into_iter()
            .filter_map(|term| {
                term.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    // normalize -0 so numerically equal values share an entry
                    .map(|value| (value + 0.0, term))
            })
            .collect();
        parsed.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));

        let mut entries: Vec<NumberMapEntry> = Vec::new();
        for (value, token) in parsed {
            match entries.last_mut() {
                Some(entry) if entry.value == value => entry.tokens.push(token.to_string()),
                _ => entries.push(NumberMapEntry {
                    value,
                    tokens: vec![token.to_string()],
                }),
            }
        }

        NumberMap { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Token set over every term whose value satisfies `comparator value`.
    pub fn match_comparator(&self, comparator: Comparator, value: f64) -> Result<TokenSet> {
        let value = value + 0.0;
        let search = self
            .entries
            .binary_search_by(|entry| entry.value.total_cmp(&value));

        let (start, end) = match comparator {
            Comparator::GreaterThan => {
                let start = match search {
                    Ok(i) => i + 1,
                    Err(insertion) => insertion,
                };
                (start, self.entries.len())
            }
            Comparator::GreaterThanOrEqual => {
                let start = match search {
                    Ok(i) => i,
                    Err(insertion) => insertion,
                };
                (start, self.entries.len())
            }
            Comparator::LessThan => {
                let end = match search {
                    Ok(i) => i,
                    Err(insertion) => insertion,
                };
                (0, end)
            }
            Comparator::LessThanOrEqual => {
                let end = match search {
                    Ok(i) => i + 1,
                    Err(insertion) => insertion,
                };
                (0, end)
            }
        };

        self.token_set_for_range(start, end)
    }

    /// Token set over every term whose value lies in `[start, end]`;
    /// unbounded endpoints extend to the corresponding extreme.
    pub fn match_range(&self, start: RangeBound, end: RangeBound) -> Result<TokenSet> {
        let start_index = match start {
            RangeBound::Unbounded => 0,
            RangeBound::Value(lo) => {
                let lo = lo + 0.0;
                self.entries.partition_point(|entry| entry.value < lo)
            }
        };
        let end_index = match end {
            RangeBound::Unbounded => self.entries.len(),
            RangeBound::Value(hi) => {
                let hi = hi + 0.0;
                self.entries.partition_point(|entry| entry.value <= hi)
            }
        };

        self.token_set_for_range(start_index, end_index.max(start_index))
    }

    fn token_set_for_range(&self, start: usize, end: usize) -> Result<TokenSet> {
        let mut tokens: Vec<&str> = self.entries[start..end]
            .iter()
            .flat_map(|entry| entry.tokens.iter().map(String::as_str))
            .collect();
        tokens.sort_unstable();
        tokens.dedup();
        TokenSet::from_sorted_words(tokens)
    }
}
