use std::sync::OnceLock;
use crate::core::error::{Error, ErrorKind, Result};

/// Sparse vector over term ordinals.
///
/// Elements are kept sorted by index; the serialized form is the flat
/// `[i0, v0, i1, v1, …]` array. The magnitude is computed on first use and
/// memoized; any mutation resets it.
#[derive(Debug, Clone, Default)]
pub struct Vector {
    elements: Vec<(usize, f64)>,
    magnitude: OnceLock<f64>,
}

impl Vector {
    pub fn new() -> Self {
        Vector::default()
    }

    /// Position at which `index` lives, or would be inserted (least upper
    /// bound over the stored indices).
    pub fn position_for_index(&self, index: usize) -> usize {
        self.elements.partition_point(|&(i, _)| i < index)
    }

    /// Insert a value at a new index; an existing index is a caller bug.
    pub fn insert(&mut self, index: usize, value: f64) -> Result<()> {
        let position = self.position_for_index(index);
        if matches!(self.elements.get(position), Some(&(i, _)) if i == index) {
            return Err(Error::new(
                ErrorKind::DuplicateIndex,
                format!("duplicate index {}", index),
            ));
        }

        self.magnitude = OnceLock::new();
        self.elements.insert(position, (index, value));
        Ok(())
    }

    /// Insert a value, combining with any existing value at the same index.
    pub fn upsert(&mut self, index: usize, value: f64, combine: impl FnOnce(f64, f64) -> f64) {
        self.magnitude = OnceLock::new();
        let position = self.position_for_index(index);

        match self.elements.get_mut(position) {
            Some(element) if element.0 == index => element.1 = combine(element.1, value),
            _ => self.elements.insert(position, (index, value)),
        }
    }

    pub fn magnitude(&self) -> f64 {
        *self.magnitude.get_or_init(|| {
            self.elements
                .iter()
                .map(|&(_, value)| value * value)
                .sum::<f64>()
                .sqrt()
        })
    }

    /// Dot product via a two-pointer merge over the sorted indices.
    pub fn dot(&self, other: &Vector) -> f64 {
        let mut product = 0.0;
        let (mut i, mut j) = (0, 0);

        while i < self.elements.len() && j < other.elements.len() {
            let (a_index, a_value) = self.elements[i];
            let (b_index, b_value) = other.elements[j];

            if a_index < b_index {
                i += 1;
            } else if a_index > b_index {
                j += 1;
            } else {
                product += a_value * b_value;
                i += 1;
                j += 1;
            }
        }

        product
    }

    /// Cosine similarity against `other`, normalized by this vector's
    /// magnitude only; 0 when this vector is empty.
    pub fn similarity(&self, other: &Vector) -> f64 {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return 0.0;
        }
        self.dot(other) / magnitude
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Flat `[i, v, i, v, …]` form used by the wire format.
    pub fn to_flat(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.elements.len() * 2);
        for &(index, value) in &self.elements {
            flat.push(index as f64);
            flat.push(value);
        }
        flat
    }

    /// Rebuild from the flat wire form.
    pub fn from_flat(flat: &[f64]) -> Vector {
        let elements = flat
            .chunks_exact(2)
            .map(|pair| (pair[0] as usize, pair[1]))
            .collect();
        Vector {
            elements,
            magnitude: OnceLock::new(),
        }
    }
}
