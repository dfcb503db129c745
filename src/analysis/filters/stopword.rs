use std::collections::HashSet;
use crate::analysis::pipeline::PipelineFunction;
use crate::analysis::token::Token;

/// Drops common words that carry little ranking signal.
pub struct StopWordFilter {
    pub stop_words: HashSet<String>,
}

impl StopWordFilter {
    pub fn new(stop_words: Vec<String>) -> Self {
        StopWordFilter {
            stop_words: stop_words.into_iter().collect(),
        }
    }

    pub fn english() -> Self {
        let words = [
            "a", "able", "about", "across", "after", "all", "almost", "also", "am",
            "among", "an", "and", "any", "are", "as", "at", "be", "because", "been",
            "but", "by", "can", "cannot", "could", "dear", "did", "do", "does",
            "either", "else", "ever", "every", "for", "from", "get", "got", "had",
            "has", "have", "he", "her", "hers", "him", "his", "how", "however", "i",
            "if", "in", "into", "is", "it", "its", "just", "least", "let", "like",
            "likely", "may", "me", "might", "most", "must", "my", "neither", "no",
            "nor", "not", "of", "off", "often", "on", "only", "or", "other", "our",
            "own", "rather", "said", "say", "says", "she", "should", "since", "so",
            "some", "than", "that", "the", "their", "them", "then", "there", "these",
            "they", "this", "tis", "to", "too", "twas", "us", "wants", "was", "we",
            "were", "what", "when", "where", "which", "while", "who", "whom", "why",
            "will", "with", "would", "yet", "you", "your",
        ];

        StopWordFilter::new(words.into_iter().map(String::from).collect())
    }
}

impl PipelineFunction for StopWordFilter {
    fn label(&self) -> &str {
        "stopWordFilter"
    }

    fn run(&self, token: &Token, _index: usize, _tokens: &[Token]) -> Vec<Token> {
        if self.stop_words.contains(&token.text) {
            Vec::new()
        } else {
            vec![token.clone()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Metadata;

    #[test]
    fn drops_stop_words() {
        let filter = StopWordFilter::english();
        let token = Token::new("the", Metadata::new());
        assert!(filter.run(&token, 0, &[]).is_empty());
    }

    #[test]
    fn keeps_content_words() {
        let filter = StopWordFilter::english();
        let token = Token::new("search", Metadata::new());
        assert_eq!(filter.run(&token, 0, &[]).len(), 1);
    }
}
