use std::collections::HashSet;

/// Document-reference set with complete and empty sentinels.
///
/// The sentinels let required/prohibited bookkeeping start from an identity
/// element without allocating: `Complete` absorbs unions and is the identity
/// for intersection, `Empty` the dual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocSet {
    Complete,
    Empty,
    Finite(HashSet<String>),
}

impl DocSet {
    pub fn from_keys<I, S>(keys: I) -> DocSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DocSet::Finite(keys.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, key: &str) -> bool {
        match self {
            DocSet::Complete => true,
            DocSet::Empty => false,
            DocSet::Finite(keys) => keys.contains(key),
        }
    }

    pub fn intersect(&self, other: &DocSet) -> DocSet {
        match (self, other) {
            (DocSet::Empty, _) | (_, DocSet::Empty) => DocSet::Empty,
            (DocSet::Complete, s) | (s, DocSet::Complete) => s.clone(),
            (DocSet::Finite(a), DocSet::Finite(b)) => {
                // iterate the smaller side
                let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
                DocSet::Finite(
                    small
                        .iter()
                        .filter(|key| large.contains(*key))
                        .cloned()
                        .collect(),
                )
            }
        }
    }

    pub fn union(&self, other: &DocSet) -> DocSet {
        match (self, other) {
            (DocSet::Complete, _) | (_, DocSet::Complete) => DocSet::Complete,
            (DocSet::Empty, s) | (s, DocSet::Empty) => s.clone(),
            (DocSet::Finite(a), DocSet::Finite(b)) => {
                DocSet::Finite(a.iter().chain(b.iter()).cloned().collect())
            }
        }
    }
}
