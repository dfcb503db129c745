/// Okapi BM25 parameters.
///
/// `k1` controls term-frequency saturation; `b` controls how strongly scores
/// are normalized by field length relative to the field's average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Params {
    pub fn set_b(&mut self, b: f64) {
        self.b = b.clamp(0.0, 1.0);
    }

    pub fn set_k1(&mut self, k1: f64) {
        self.k1 = k1;
    }

    /// Raw BM25 score of one term in one field, before boosts.
    pub fn score(&self, idf: f64, term_frequency: f64, field_length: f64, average_field_length: f64) -> f64 {
        let numerator = idf * (self.k1 + 1.0) * term_frequency;
        let denominator = self.k1
            * (1.0 - self.b + self.b * (field_length / average_field_length))
            + term_frequency;
        numerator / denominator
    }
}

/// Inverse document frequency with 0.5 smoothing. `doc_freq` counts the
/// (field, document) pairs the term appears in.
pub fn inverse_document_frequency(doc_freq: usize, document_count: usize) -> f64 {
    let x = (document_count as f64 - doc_freq as f64 + 0.5) / (doc_freq as f64 + 0.5);
    (1.0 + x.abs()).ln()
}
