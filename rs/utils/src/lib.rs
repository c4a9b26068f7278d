pub mod distance;
pub mod input;
pub mod kmeans_builder;
pub mod stats;
pub mod test_utils;

pub trait DistanceCalculator {
    fn calculate(&self, a: &[f32], b: &[f32]) -> f32;
}
