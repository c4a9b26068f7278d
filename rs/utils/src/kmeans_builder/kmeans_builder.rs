use anyhow::{anyhow, Result};
use config::enums::InitMethod;
use log::debug;
use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::distance::l2::{CalculateSquared, MaskedL2DistanceCalculator};

#[derive(PartialEq, Debug)]
pub enum KMeansVariant {
    Lloyd,
}

pub struct KMeansBuilder {
    pub num_clusters: usize,
    pub max_iter: usize,

    // data shape
    pub dimension: usize,

    // Variant for this algorithm. Currently only Lloyd is supported.
    pub variant: KMeansVariant,

    pub init_method: InitMethod,

    // None means seeded from entropy.
    pub seed: Option<u64>,
}

pub struct KMeansResult {
    // Flattened centroids
    pub centroids: Vec<f32>,
    pub assignments: Vec<usize>,

    // Sum of squared distances from each point to its assigned centroid
    pub error: f32,
    pub num_iterations: usize,
}

impl KMeansResult {
    pub fn centroids_as_array(&self, dimension: usize) -> Result<Array2<f32>> {
        let num_clusters = self.centroids.len() / dimension;
        Array2::from_shape_vec((num_clusters, dimension), self.centroids.clone())
            .map_err(|e| anyhow!("Invalid centroid shape: {}", e))
    }
}

impl KMeansBuilder {
    pub fn new(
        num_clusters: usize,
        max_iter: usize,
        dimension: usize,
        variant: KMeansVariant,
    ) -> Self {
        Self {
            num_clusters,
            max_iter,
            dimension,
            variant,
            init_method: InitMethod::default(),
            seed: None,
        }
    }

    pub fn with_init_method(mut self, init_method: InitMethod) -> Self {
        self.init_method = init_method;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Runs one k-means trial. Fails when the data doesn't fit the builder, or when a cluster
    /// ends up with no points: a trial like that has no valid k-cluster result.
    pub fn fit(&self, data: ArrayView2<'_, f32>) -> Result<KMeansResult> {
        if data.ncols() != self.dimension {
            return Err(anyhow!(
                "Dimension of data point {} is not equal to dimension of KMeans object {}",
                data.ncols(),
                self.dimension
            ));
        }
        if self.num_clusters == 0 {
            return Err(anyhow!("Number of clusters must be positive"));
        }
        if self.num_clusters > data.nrows() {
            return Err(anyhow!(
                "Cannot build {} clusters from {} data points",
                self.num_clusters,
                data.nrows()
            ));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        match self.variant {
            KMeansVariant::Lloyd => self.run_lloyd(data, &mut rng),
        }
    }

    fn init_centroids(&self, data: ArrayView2<'_, f32>, rng: &mut StdRng) -> Result<Vec<f32>> {
        match self.init_method {
            InitMethod::RandomSample => {
                let mut centroids = Vec::with_capacity(self.num_clusters * self.dimension);
                for idx in sample(rng, data.nrows(), self.num_clusters).into_iter() {
                    centroids.extend(data.row(idx).iter());
                }
                Ok(centroids)
            }
            InitMethod::RandomLabels => {
                let labels = (0..data.nrows())
                    .map(|_| rng.gen_range(0..self.num_clusters))
                    .collect::<Vec<usize>>();
                self.compute_centroids(data, &labels)
            }
        }
    }

    /// Per-cluster mean over the finite values of each dimension.
    fn compute_centroids(&self, data: ArrayView2<'_, f32>, labels: &[usize]) -> Result<Vec<f32>> {
        let mut sums = vec![0.0f64; self.num_clusters * self.dimension];
        let mut counts = vec![0usize; self.num_clusters * self.dimension];
        let mut cluster_sizes = vec![0usize; self.num_clusters];

        for (row, &label) in data.outer_iter().zip(labels.iter()) {
            cluster_sizes[label] += 1;
            for (j, &value) in row.iter().enumerate() {
                if value.is_finite() {
                    sums[label * self.dimension + j] += value as f64;
                    counts[label * self.dimension + j] += 1;
                }
            }
        }

        if let Some(empty) = cluster_sizes.iter().position(|&size| size == 0) {
            return Err(anyhow!("Cluster {} has no data points", empty));
        }

        Ok(sums
            .iter()
            .zip(counts.iter())
            .map(|(&sum, &count)| {
                if count == 0 {
                    f32::NAN
                } else {
                    (sum / count as f64) as f32
                }
            })
            .collect())
    }

    fn assign(&self, data: ArrayView2<'_, f32>, centroids: &[f32]) -> Vec<usize> {
        let distance_calculator = MaskedL2DistanceCalculator::new();
        (0..data.nrows())
            .into_par_iter()
            .map(|i| {
                let row = data.row(i);
                let point = row.to_vec();
                let mut min_distance = f32::MAX;
                let mut label = 0;
                for (centroid_id, centroid) in centroids.chunks_exact(self.dimension).enumerate()
                {
                    let distance = distance_calculator.calculate_squared(&point, centroid);
                    if distance < min_distance {
                        min_distance = distance;
                        label = centroid_id;
                    }
                }
                label
            })
            .collect::<Vec<usize>>()
    }

    fn run_lloyd(&self, data: ArrayView2<'_, f32>, rng: &mut StdRng) -> Result<KMeansResult> {
        let mut centroids = self.init_centroids(data, rng)?;
        let mut cluster_labels = self.assign(data, &centroids);
        let mut num_iterations = 0;

        for iteration in 0..self.max_iter {
            num_iterations = iteration + 1;
            centroids = self.compute_centroids(data, &cluster_labels).map_err(|e| {
                anyhow!("Lloyd iteration {} left an empty cluster: {}", iteration, e)
            })?;

            let new_labels = self.assign(data, &centroids);
            let changed = new_labels
                .iter()
                .zip(cluster_labels.iter())
                .filter(|(a, b)| a != b)
                .count();
            debug!("Iteration {} - {} points changed cluster", iteration, changed);

            // Check convergence
            if changed == 0 {
                break;
            }
            cluster_labels = new_labels;
        }

        // Keep centroids consistent with the final labels when the iteration cap was hit.
        centroids = self.compute_centroids(data, &cluster_labels)?;

        let distance_calculator = MaskedL2DistanceCalculator::new();
        let error = data
            .outer_iter()
            .zip(cluster_labels.iter())
            .map(|(row, &label)| {
                let point = row.to_vec();
                let centroid = &centroids[label * self.dimension..(label + 1) * self.dimension];
                distance_calculator.calculate_squared(&point, centroid) as f64
            })
            .sum::<f64>() as f32;

        if !error.is_finite() {
            return Err(anyhow!("K-means error is not finite: {}", error));
        }

        Ok(KMeansResult {
            centroids,
            assignments: cluster_labels,
            error,
            num_iterations,
        })
    }
}
