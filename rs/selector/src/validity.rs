//! Davies-Bouldin cluster validity index.
//!
//! For clusters i and j with dispersions S_i, S_j and prototype separation M_ij:
//!
//! ```text
//! S_i  = ( mean_{x in C_i} ||x - c_i||_2^p )^(1/p)     only when |C_i| > 1
//! M_ij = ( sum_d |c_i,d - c_j,d|^p )^(1/p)
//! R_ij = (S_i + S_j) / M_ij
//! R_i  = max_{j != i} R_ij
//! DB   = mean_i R_i
//! ```
//!
//! Lower is better. Undefined values are skipped rather than treated as errors: a pair where either
//! dispersion is undefined doesn't take part in the maximum, and a cluster whose R_i is undefined
//! doesn't take part in the mean. When nothing is left the index itself is undefined. Coinciding
//! prototypes give M_ij = 0, so R_ij and the index are infinite.
//!
//! Dispersion and separation both skip dimensions where either side is non-finite.

use ndarray::ArrayView2;
use utils::distance::l2::MaskedL2DistanceCalculator;
use utils::distance::minkowski::MinkowskiDistanceCalculator;
use utils::DistanceCalculator;

#[derive(Debug, Clone, Copy)]
pub struct DaviesBouldin {
    norm_order: f32,
}

impl Default for DaviesBouldin {
    fn default() -> Self {
        Self { norm_order: 2.0 }
    }
}

impl DaviesBouldin {
    pub fn new(norm_order: f32) -> Self {
        Self { norm_order }
    }

    /// S_i for every cluster. `None` for clusters with fewer than two members.
    ///
    /// Assignments outside `[0, num_prototypes)` are ignored.
    pub fn dispersions(
        &self,
        data: ArrayView2<'_, f32>,
        prototypes: ArrayView2<'_, f32>,
        assignments: &[usize],
    ) -> Vec<Option<f32>> {
        let num_clusters = prototypes.nrows();
        let distance_calculator = MaskedL2DistanceCalculator::new();
        let mut sums = vec![0.0f64; num_clusters];
        let mut counts = vec![0usize; num_clusters];

        for (row, &label) in data.outer_iter().zip(assignments.iter()) {
            if label >= num_clusters {
                continue;
            }
            let point = row.to_vec();
            let prototype = prototypes.row(label).to_vec();
            let distance = distance_calculator.calculate(&point, &prototype);
            sums[label] += (distance as f64).powf(self.norm_order as f64);
            counts[label] += 1;
        }

        sums.iter()
            .zip(counts.iter())
            .map(|(&sum, &count)| {
                if count > 1 {
                    Some((sum / count as f64).powf(1.0 / self.norm_order as f64) as f32)
                } else {
                    None
                }
            })
            .collect()
    }

    /// The index, or `None` when it can't be computed (fewer than two clusters, or no pair of
    /// clusters with defined dispersions).
    pub fn score(
        &self,
        data: ArrayView2<'_, f32>,
        prototypes: ArrayView2<'_, f32>,
        assignments: &[usize],
    ) -> Option<f32> {
        let num_clusters = prototypes.nrows();
        if num_clusters < 2 {
            return None;
        }

        let dispersions = self.dispersions(data, prototypes, assignments);
        let separation = MinkowskiDistanceCalculator::new(self.norm_order);
        let prototype_rows = prototypes
            .outer_iter()
            .map(|row| row.to_vec())
            .collect::<Vec<Vec<f32>>>();

        // R_ij is symmetric; the upper triangle is enough.
        let mut worst_similarity: Vec<Option<f32>> = vec![None; num_clusters];
        for i in 0..num_clusters {
            for j in (i + 1)..num_clusters {
                let (Some(s_i), Some(s_j)) = (dispersions[i], dispersions[j]) else {
                    continue;
                };
                let separation_ij = separation.calculate(&prototype_rows[i], &prototype_rows[j]);
                let similarity = (s_i + s_j) / separation_ij;
                if similarity.is_nan() {
                    continue;
                }
                for idx in [i, j] {
                    worst_similarity[idx] = Some(match worst_similarity[idx] {
                        Some(current) => current.max(similarity),
                        None => similarity,
                    });
                }
            }
        }

        let defined = worst_similarity.into_iter().flatten().collect::<Vec<f32>>();
        if defined.is_empty() {
            return None;
        }
        Some(defined.iter().map(|&r| r as f64).sum::<f64>() as f32 / defined.len() as f32)
    }
}

/// Davies-Bouldin index with the given norm order.
pub fn davies_bouldin(
    data: ArrayView2<'_, f32>,
    prototypes: ArrayView2<'_, f32>,
    assignments: &[usize],
    norm_order: f32,
) -> Option<f32> {
    DaviesBouldin::new(norm_order).score(data, prototypes, assignments)
}
