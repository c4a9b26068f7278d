use anyhow::{anyhow, Result};
use log::debug;
use ndarray::{Array2, ArrayView2};
use utils::distance::l2::{CalculateSquared, MaskedL2DistanceCalculator};

use crate::quantization::{BestMatch, Quantizer};

/// Quantizes points to the nearest row of a prototype matrix.
///
/// Missing (non-finite) components are ignored on both sides of every comparison, the same way the
/// k-means builder compares points to centroids.
pub struct PrototypeQuantizer {
    prototypes: Array2<f32>,
    distance_calculator: MaskedL2DistanceCalculator,
}

impl PrototypeQuantizer {
    pub fn new(prototypes: Array2<f32>) -> Result<Self> {
        if prototypes.nrows() == 0 || prototypes.ncols() == 0 {
            return Err(anyhow!(
                "Prototype matrix must be non-empty, got {:?}",
                prototypes.dim()
            ));
        }
        Ok(Self {
            prototypes,
            distance_calculator: MaskedL2DistanceCalculator::new(),
        })
    }
}

impl Quantizer for PrototypeQuantizer {
    fn quantize(&self, value: &[f32]) -> BestMatch {
        let mut best = BestMatch {
            index: 0,
            quantization_error: f32::MAX,
        };
        for (index, prototype) in self.prototypes.outer_iter().enumerate() {
            let prototype = prototype.to_vec();
            let distance = self.distance_calculator.calculate_squared(value, &prototype);
            if distance < best.quantization_error {
                best = BestMatch {
                    index,
                    quantization_error: distance,
                };
            }
        }
        best.quantization_error = best.quantization_error.sqrt();
        best
    }

    fn num_prototypes(&self) -> usize {
        self.prototypes.nrows()
    }

    fn dimension(&self) -> usize {
        self.prototypes.ncols()
    }
}

/// Best-matching prototype and quantization error for every row of `data`.
pub fn nearest_prototype(
    prototypes: ArrayView2<'_, f32>,
    data: ArrayView2<'_, f32>,
) -> Result<(Vec<usize>, Vec<f32>)> {
    if prototypes.ncols() != data.ncols() {
        return Err(anyhow!(
            "Prototype dimension {} is not equal to data dimension {}",
            prototypes.ncols(),
            data.ncols()
        ));
    }
    let quantizer = PrototypeQuantizer::new(prototypes.to_owned())?;

    let (indices, errors): (Vec<usize>, Vec<f32>) = data
        .outer_iter()
        .map(|row| {
            let best = quantizer.quantize(&row.to_vec());
            (best.index, best.quantization_error)
        })
        .unzip();
    debug!(
        "Quantized {} points against {} prototypes",
        data.nrows(),
        quantizer.num_prototypes()
    );
    Ok((indices, errors))
}
