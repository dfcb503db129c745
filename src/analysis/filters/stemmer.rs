use rust_stemmers::{Algorithm, Stemmer};
use crate::analysis::pipeline::PipelineFunction;
use crate::analysis::token::Token;

/// Reduces English tokens to their stems.
pub struct PorterStemmer {
    stemmer: Stemmer,
}

impl PorterStemmer {
    pub fn new() -> Self {
        PorterStemmer {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for PorterStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineFunction for PorterStemmer {
    fn label(&self) -> &str {
        "stemmer"
    }

    fn run(&self, token: &Token, _index: usize, _tokens: &[Token]) -> Vec<Token> {
        vec![token.update(|text| self.stemmer.stem(text).to_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Metadata;

    fn stem(text: &str) -> String {
        let token = Token::new(text, Metadata::new());
        PorterStemmer::new().run(&token, 0, &[]).remove(0).text
    }

    #[test]
    fn stems_plurals_and_inflections() {
        assert_eq!(stem("trees"), "tree");
        assert_eq!(stem("walking"), "walk");
    }

    #[test]
    fn related_forms_share_a_stem() {
        assert_eq!(stem("tree"), stem("trees"));
    }
}
