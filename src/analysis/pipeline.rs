use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use parking_lot::RwLock;
use tracing::warn;
use crate::analysis::token::{Metadata, Token};
use crate::core::error::{Error, ErrorKind, Result};

/// A single token-transforming stage.
///
/// A stage sees one token at a time together with its ordinal and the full
/// token list from the previous stage, and emits zero, one or many
/// replacement tokens. Stages must not retain tokens they do not return.
pub trait PipelineFunction: Send + Sync {
    /// Stable label used for registration and pipeline serialization.
    fn label(&self) -> &str;

    fn run(&self, token: &Token, index: usize, tokens: &[Token]) -> Vec<Token>;
}

static REGISTRY: LazyLock<RwLock<HashMap<String, Arc<dyn PipelineFunction>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register a function under its label so serialized pipelines can be loaded.
/// Overwriting an existing label logs a warning.
pub fn register_function(function: Arc<dyn PipelineFunction>) {
    let label = function.label().to_string();
    let mut registry = REGISTRY.write();

    if registry.contains_key(&label) {
        warn!(label = %label, "overwriting registered pipeline function");
    }
    registry.insert(label, function);
}

pub fn registered_function(label: &str) -> Option<Arc<dyn PipelineFunction>> {
    REGISTRY.read().get(label).cloned()
}

/// Ordered chain of pipeline functions applied to every token at index and
/// search time.
#[derive(Clone, Default)]
pub struct Pipeline {
    stack: Vec<Arc<dyn PipelineFunction>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline { stack: Vec::new() }
    }

    /// Rebuild a pipeline from serialized labels. Unknown labels are fatal.
    pub fn load(labels: &[String]) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new();
        for label in labels {
            let function = registered_function(label).ok_or_else(|| {
                Error::new(
                    ErrorKind::UnregisteredPipelineFunction,
                    format!("cannot load unregistered pipeline function '{}'", label),
                )
            })?;
            pipeline.stack.push(function);
        }
        Ok(pipeline)
    }

    pub fn add(&mut self, function: Arc<dyn PipelineFunction>) {
        self.stack.push(function);
    }

    pub fn insert_before(
        &mut self,
        existing_label: &str,
        function: Arc<dyn PipelineFunction>,
    ) -> Result<()> {
        let position = self.position_of(existing_label)?;
        self.stack.insert(position, function);
        Ok(())
    }

    pub fn insert_after(
        &mut self,
        existing_label: &str,
        function: Arc<dyn PipelineFunction>,
    ) -> Result<()> {
        let position = self.position_of(existing_label)?;
        self.stack.insert(position + 1, function);
        Ok(())
    }

    /// Remove the stage with the given label; missing labels are ignored.
    pub fn remove(&mut self, label: &str) {
        self.stack.retain(|function| function.label() != label);
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Run every stage over the token list in order. Each stage operates on
    /// the complete output of the previous stage.
    pub fn run(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut tokens = tokens;
        for function in &self.stack {
            let mut output = Vec::with_capacity(tokens.len());
            for (index, token) in tokens.iter().enumerate() {
                output.extend(function.run(token, index, &tokens));
            }
            tokens = output;
        }
        tokens
    }

    /// Wrap a raw string as a single token, run the pipeline, and return the
    /// surviving surface strings.
    pub fn run_string(&self, raw: &str, metadata: Metadata) -> Vec<String> {
        let token = Token::new(raw, metadata);
        self.run(vec![token]).into_iter().map(|t| t.text).collect()
    }

    /// Serialized form: the stage labels in order. Stages missing from the
    /// registry are warned about, since the pipeline will not load back.
    pub fn to_json(&self) -> Vec<String> {
        self.stack
            .iter()
            .map(|function| {
                let label = function.label();
                if registered_function(label).is_none() {
                    warn!(label = %label, "serializing pipeline with unregistered function");
                }
                label.to_string()
            })
            .collect()
    }

    fn position_of(&self, label: &str) -> Result<usize> {
        self.stack
            .iter()
            .position(|function| function.label() == label)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidArgument,
                    format!("pipeline does not contain function '{}'", label),
                )
            })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stack.iter().map(|function| function.label()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upcase;

    impl PipelineFunction for Upcase {
        fn label(&self) -> &str {
            "upcase"
        }

        fn run(&self, token: &Token, _index: usize, _tokens: &[Token]) -> Vec<Token> {
            vec![token.update(|text| text.to_uppercase())]
        }
    }

    struct DropShort;

    impl PipelineFunction for DropShort {
        fn label(&self) -> &str {
            "dropShort"
        }

        fn run(&self, token: &Token, _index: usize, _tokens: &[Token]) -> Vec<Token> {
            if token.text.len() < 3 {
                Vec::new()
            } else {
                vec![token.clone()]
            }
        }
    }

    struct Duplicate;

    impl PipelineFunction for Duplicate {
        fn label(&self) -> &str {
            "duplicate"
        }

        fn run(&self, token: &Token, _index: usize, _tokens: &[Token]) -> Vec<Token> {
            vec![token.clone(), token.clone()]
        }
    }

    fn token(text: &str) -> Token {
        Token::new(text, Metadata::new())
    }

    #[test]
    fn stages_run_in_order() {
        let mut pipeline = Pipeline::new();
        pipeline.add(Arc::new(DropShort));
        pipeline.add(Arc::new(Upcase));

        let output = pipeline.run(vec![token("ab"), token("walking")]);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].text, "WALKING");
    }

    #[test]
    fn a_stage_may_emit_many_tokens() {
        let mut pipeline = Pipeline::new();
        pipeline.add(Arc::new(Duplicate));

        let output = pipeline.run(vec![token("one"), token("two")]);
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn insert_before_and_after_position_by_label() {
        let mut pipeline = Pipeline::new();
        pipeline.add(Arc::new(Upcase));
        pipeline.insert_before("upcase", Arc::new(DropShort)).unwrap();
        pipeline.insert_after("upcase", Arc::new(Duplicate)).unwrap();

        assert_eq!(pipeline.to_json(), vec!["dropShort", "upcase", "duplicate"]);
    }

    #[test]
    fn insert_before_unknown_label_fails() {
        let mut pipeline = Pipeline::new();
        let err = pipeline.insert_before("missing", Arc::new(Upcase)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn remove_and_reset() {
        let mut pipeline = Pipeline::new();
        pipeline.add(Arc::new(Upcase));
        pipeline.add(Arc::new(DropShort));

        pipeline.remove("upcase");
        assert_eq!(pipeline.len(), 1);

        pipeline.reset();
        assert!(pipeline.is_empty());
    }

    #[test]
    fn run_string_returns_surviving_strings() {
        let mut pipeline = Pipeline::new();
        pipeline.add(Arc::new(Upcase));

        assert_eq!(pipeline.run_string("walking", Metadata::new()), vec!["WALKING"]);
    }

    #[test]
    fn load_resolves_registered_labels() {
        register_function(Arc::new(Upcase));

        let pipeline = Pipeline::load(&["upcase".to_string()]).unwrap();
        assert_eq!(pipeline.len(), 1);

        let err = Pipeline::load(&["unknown".to_string()]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnregisteredPipelineFunction);
    }
}
