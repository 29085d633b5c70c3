use std::fmt;

use crate::index::distance;

/// A single image described by the mean of its Red, Green and Blue channels.
///
/// Value type: copied freely into and out of every index. `image_id` carries no
/// meaning for the metric and is preserved only for traceability.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    pub image_id: i64,
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl FeatureVector {
    pub fn new(image_id: i64, r: f64, g: f64, b: f64) -> Self {
        Self { image_id, r, g, b }
    }

    /// True when all three channels are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    #[inline]
    pub fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Cosine distance to `other`, in [0, 2].
    #[inline]
    pub fn distance_to(&self, other: &FeatureVector) -> f64 {
        distance::cosine_distance(self, other)
    }

    /// Cosine similarity to `other`, in [-1, 1].
    #[inline]
    pub fn similarity_to(&self, other: &FeatureVector) -> f64 {
        distance::cosine_similarity(self, other)
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image ID: {} (R={}, G={}, B={})",
            self.image_id, self.r, self.g, self.b
        )
    }
}
