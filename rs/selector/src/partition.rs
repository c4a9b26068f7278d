use anyhow::Result;
use config::enums::InitMethod;
use log::debug;
use ndarray::{Array2, ArrayView2};
use utils::kmeans_builder::kmeans_builder::{KMeansBuilder, KMeansVariant};

/// One clustering of a dataset into a fixed number of clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// One row per cluster.
    pub prototypes: Array2<f32>,
    /// 0-based cluster index of every data point.
    pub assignments: Vec<usize>,
    /// Sum of squared distances from each point to its prototype.
    pub error: f32,
}

impl Partition {
    pub fn num_clusters(&self) -> usize {
        self.prototypes.nrows()
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_clusters()];
        for &label in &self.assignments {
            if let Some(size) = sizes.get_mut(label) {
                *size += 1;
            }
        }
        sizes
    }
}

/// A single randomized clustering run for a fixed k.
///
/// Implementations must be deterministic for a given `seed`. A run that can't produce `num_clusters`
/// non-empty clusters returns an error.
pub trait Partitioner: Sync {
    fn partition(
        &self,
        data: ArrayView2<'_, f32>,
        num_clusters: usize,
        max_iteration: usize,
        seed: u64,
    ) -> Result<Partition>;
}

/// Lloyd's k-means through [`KMeansBuilder`].
#[derive(Debug, Clone, Default)]
pub struct LloydPartitioner {
    init_method: InitMethod,
}

impl LloydPartitioner {
    pub fn new(init_method: InitMethod) -> Self {
        Self { init_method }
    }
}

impl Partitioner for LloydPartitioner {
    fn partition(
        &self,
        data: ArrayView2<'_, f32>,
        num_clusters: usize,
        max_iteration: usize,
        seed: u64,
    ) -> Result<Partition> {
        let dimension = data.ncols();
        let result = KMeansBuilder::new(num_clusters, max_iteration, dimension, KMeansVariant::Lloyd)
            .with_init_method(self.init_method)
            .with_seed(seed)
            .fit(data)?;
        debug!(
            "Lloyd run for k={} with seed {} stopped after {} iterations",
            num_clusters, seed, result.num_iterations
        );
        Ok(Partition {
            prototypes: result.centroids_as_array(dimension)?,
            assignments: result.assignments,
            error: result.error,
        })
    }
}

/// Seed of one trial, derived from the run's base seed, the cluster count and the trial index.
///
/// Trial seeds don't depend on the number of trials, so running more trials only ever appends to
/// the sequence.
pub fn trial_seed(base_seed: u64, num_clusters: usize, trial: usize) -> u64 {
    // splitmix64 finalizer over the combined inputs
    let mut z = base_seed
        .wrapping_add((num_clusters as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add((trial as u64).wrapping_mul(0xD1B5_4A32_D192_ED03));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
