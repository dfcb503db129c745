use crate::search::match_data::MatchData;

/// One ranked hit: the matching document's ref, its summed score across
/// fields, and the metadata of every contributing match.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub doc_ref: String,
    pub score: f64,
    pub match_data: MatchData,
}
