use crate::analysis::pipeline::PipelineFunction;
use crate::analysis::token::Token;

/// Strips leading and trailing non-word characters from each token.
pub struct Trimmer;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl PipelineFunction for Trimmer {
    fn label(&self) -> &str {
        "trimmer"
    }

    fn run(&self, token: &Token, _index: usize, _tokens: &[Token]) -> Vec<Token> {
        vec![token.update(|text| text.trim_matches(|c: char| !is_word_char(c)).to_string())]
    }
}
