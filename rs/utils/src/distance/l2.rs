use crate::DistanceCalculator;

/// Trait for calculating the squared distance between two vectors. An optimization for when the true
/// L2 distance is not needed.
pub trait CalculateSquared {
    fn calculate_squared(&self, a: &[f32], b: &[f32]) -> f32;
}

/// L2 distance restricted to the dimensions where both vectors hold a finite value.
///
/// Non-finite components mark missing measurements. They are skipped on either side of the
/// comparison, so a point with gaps is compared on the dimensions it has. Two vectors without any
/// shared finite dimension are at distance 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskedL2DistanceCalculator {}

impl MaskedL2DistanceCalculator {
    pub fn new() -> Self {
        Self {}
    }
}

impl CalculateSquared for MaskedL2DistanceCalculator {
    fn calculate_squared(&self, a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (x - y).powi(2))
            .sum::<f32>()
    }
}

impl DistanceCalculator for MaskedL2DistanceCalculator {
    fn calculate(&self, a: &[f32], b: &[f32]) -> f32 {
        self.calculate_squared(a, b).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_l2_distance() {
        let calculator = MaskedL2DistanceCalculator::new();
        let a = [0.0, 0.0, 0.0];
        let b = [3.0, 4.0, 0.0];
        assert_abs_diff_eq!(calculator.calculate_squared(&a, &b), 25.0, epsilon = EPSILON);
        assert_abs_diff_eq!(calculator.calculate(&a, &b), 5.0, epsilon = EPSILON);
    }

    #[test]
    fn test_missing_dimensions_are_skipped() {
        let calculator = MaskedL2DistanceCalculator::new();
        let a = [1.0, f32::NAN, 3.0];
        let b = [2.0, 100.0, f32::INFINITY];
        // Only the first dimension is shared.
        assert_abs_diff_eq!(calculator.calculate_squared(&a, &b), 1.0, epsilon = EPSILON);
        assert_abs_diff_eq!(calculator.calculate_squared(&b, &a), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_no_shared_dimension() {
        let calculator = MaskedL2DistanceCalculator::new();
        let a = [f32::NAN, 1.0];
        let b = [1.0, f32::NAN];
        assert_eq!(calculator.calculate(&a, &b), 0.0);
    }
}
