use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::enums::InitMethod;

/// Config for a sweep over cluster counts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Largest cluster count to explore. Every k in 1..=max_clusters gets a clustering.
    /// Default: None, which resolves to ceil(sqrt(number of data points))
    pub max_clusters: Option<usize>,

    /// Number of independent k-means trials per cluster count. Only the trial with the
    /// lowest error is kept.
    /// Default: 5
    pub num_trials: usize,

    /// Maximum number of Lloyd iterations for a single trial.
    /// Don't change unless you know what you're doing.
    /// Default: 100
    pub max_iteration: usize,

    /// Norm order used by the Davies-Bouldin index, both for cluster dispersion and for
    /// the Minkowski distance between prototypes.
    /// Default: 2.0
    pub norm_order: f32,

    /// How each trial picks its starting prototypes.
    /// Default: RandomSample
    pub init_method: InitMethod,

    /// Base seed. Trial seeds are derived from this, the cluster count and the trial index,
    /// so a fixed seed makes the whole sweep reproducible.
    /// Default: None (a fresh seed is drawn for every run)
    pub seed: Option<u64>,

    /// Run the trials of one cluster count on the rayon thread pool. Results are identical
    /// to a sequential run with the same seed.
    /// Default: false
    pub parallel: bool,

    /// Report progress through the log facade.
    /// Default: false
    pub verbose: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            max_clusters: None,
            num_trials: 5,
            max_iteration: 100,
            norm_order: 2.0,
            init_method: InitMethod::RandomSample,
            seed: None,
            parallel: false,
            verbose: false,
        }
    }
}

impl ClusteringConfig {
    /// Resolve `max_clusters` against the number of data points.
    pub fn max_clusters_for(&self, num_points: usize) -> usize {
        self.max_clusters
            .unwrap_or_else(|| (num_points as f64).sqrt().ceil() as usize)
    }

    pub fn with_max_clusters(mut self, max_clusters: usize) -> Self {
        self.max_clusters = Some(max_clusters);
        self
    }

    pub fn with_num_trials(mut self, num_trials: usize) -> Self {
        self.num_trials = num_trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: ClusteringConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }
}
