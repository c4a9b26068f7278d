/// The prototype a point quantizes to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    pub index: usize,

    // Distance from the point to the prototype
    pub quantization_error: f32,
}

pub trait Quantizer {
    /// Find the prototype nearest to `value`.
    fn quantize(&self, value: &[f32]) -> BestMatch;

    fn num_prototypes(&self) -> usize;

    fn dimension(&self) -> usize;
}
