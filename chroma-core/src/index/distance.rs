use crate::vector::FeatureVector;

/// Cosine Similarity (DotProduct / (NormA * NormB))
/// Range: [-1.0, 1.0]
///
/// A zero-magnitude operand yields 0.0 (distance 1.0, neutral dissimilarity).
/// Each operand is scaled by its largest channel first, so the squared norms
/// stay finite for any finite input.
#[inline]
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let scale_a = max_abs_channel(a);
    let scale_b = max_abs_channel(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return 0.0;
    }

    let (ar, ag, ab) = (a.r / scale_a, a.g / scale_a, a.b / scale_a);
    let (br, bg, bb) = (b.r / scale_b, b.g / scale_b, b.b / scale_b);
    let dot_product = ar * br + ag * bg + ab * bb;
    let norm_sq_a = ar * ar + ag * ag + ab * ab;
    let norm_sq_b = br * br + bg * bg + bb * bb;

    // sqrt(x * x) == x exactly, so identical and parallel vectors land on 1.0.
    let similarity = dot_product / (norm_sq_a * norm_sq_b).sqrt();
    similarity.clamp(-1.0, 1.0)
}

#[inline]
fn max_abs_channel(v: &FeatureVector) -> f64 {
    v.r.abs().max(v.g.abs()).max(v.b.abs())
}

/// Cosine Distance (1 - CosineSimilarity)
/// Range: [0.0, 2.0]
#[inline]
pub fn cosine_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    1.0 - cosine_similarity(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(r: f64, g: f64, b: f64) -> FeatureVector {
        FeatureVector::new(0, r, g, b)
    }

    #[test]
    fn test_self_distance_is_zero() {
        for a in [v(10.0, 10.0, 10.0), v(12.0, 9.0, 11.0), v(254.3, 0.1, 77.7)] {
            assert_eq!(cosine_distance(&a, &a), 0.0);
            assert_eq!(cosine_similarity(&a, &a), 1.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let a = v(12.0, 9.0, 11.0);
        let b = v(200.0, 13.5, 90.25);
        assert_eq!(cosine_distance(&a, &b), cosine_distance(&b, &a));
    }

    #[test]
    fn test_parallel_vectors_tie() {
        let a = v(10.0, 10.0, 10.0);
        let b = v(200.0, 200.0, 200.0);
        assert_eq!(cosine_distance(&a, &b), 0.0);
    }

    #[test]
    fn test_zero_magnitude_is_neutral() {
        let zero = v(0.0, 0.0, 0.0);
        let a = v(3.0, 4.0, 5.0);
        assert_eq!(cosine_distance(&zero, &a), 1.0);
        assert_eq!(cosine_distance(&a, &zero), 1.0);
        assert_eq!(cosine_distance(&zero, &zero), 1.0);
    }

    #[test]
    fn test_extreme_magnitudes_stay_in_range() {
        let huge = v(1e200, 3e200, 2e200);
        assert_eq!(cosine_distance(&huge, &huge), 0.0);
        assert!(cosine_distance(&huge, &v(1.0, 3.0, 2.0)).abs() < 1e-12);

        let edge = v(f64::MAX, f64::MAX, 1.0);
        let d = cosine_distance(&edge, &v(1.0, 2.0, 3.0));
        assert!((0.0..=2.0).contains(&d), "{}", d);
        assert_eq!(cosine_distance(&edge, &edge), 0.0);

        let tiny = v(5e-324, 0.0, 0.0);
        assert_eq!(cosine_distance(&tiny, &v(1.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_range() {
        let a = v(1.0, 0.0, 0.0);
        let opposite = v(-1.0, 0.0, 0.0);
        let orthogonal = v(0.0, 1.0, 0.0);
        assert_eq!(cosine_distance(&a, &opposite), 2.0);
        assert!((cosine_distance(&a, &orthogonal) - 1.0).abs() < 1e-12);
        let d = cosine_distance(&a, &v(12.0, 9.0, 11.0));
        assert!((0.0..=2.0).contains(&d));
        assert!((cosine_similarity(&a, &v(12.0, 9.0, 11.0)) - (1.0 - d)).abs() < 1e-15);
    }
}
