pub mod trimmer;
pub mod stopword;
pub mod stemmer;

use std::sync::{Arc, LazyLock};
use crate::analysis::pipeline::register_function;

pub use stemmer::PorterStemmer;
pub use stopword::StopWordFilter;
pub use trimmer::Trimmer;

static DEFAULTS: LazyLock<()> = LazyLock::new(|| {
    register_function(Arc::new(Trimmer));
    register_function(Arc::new(StopWordFilter::english()));
    register_function(Arc::new(PorterStemmer::new()));
});

/// Register the default stages (trimmer, English stop words, stemmer) under
/// their stable labels. Idempotent.
pub fn register_defaults() {
    LazyLock::force(&DEFAULTS);
}
