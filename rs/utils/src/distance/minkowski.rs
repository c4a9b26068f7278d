use crate::DistanceCalculator;

/// Minkowski distance of order `p`: (Σ |a_d - b_d|^p)^(1/p).
///
/// Like [`super::l2::MaskedL2DistanceCalculator`], dimensions where either side is non-finite are
/// skipped. At `p = 2` the two calculators agree.
#[derive(Debug, Clone, Copy)]
pub struct MinkowskiDistanceCalculator {
    p: f32,
}

impl MinkowskiDistanceCalculator {
    pub fn new(p: f32) -> Self {
        Self { p }
    }
}

impl DistanceCalculator for MinkowskiDistanceCalculator {
    fn calculate(&self, a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (x - y).abs().powf(self.p))
            .sum::<f32>()
            .powf(1.0 / self.p)
    }
}
