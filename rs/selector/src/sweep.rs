use config::clustering::ClusteringConfig;
use log::{info, warn};
use ndarray::Array2;
use serde::Serialize;

use crate::dataset::{Dataset, IntoDataset};
use crate::error::{Error, Result};
use crate::observer::{LoggingObserver, NoopObserver, ProgressObserver};
use crate::partition::{LloydPartitioner, Partition, Partitioner};
use crate::selector::{baseline, MultiRestartSelector};
use crate::validity::DaviesBouldin;

/// The clustering kept for one cluster count.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub num_clusters: usize,
    pub prototypes: Array2<f32>,
    pub assignments: Vec<usize>,
    pub error: f32,
    /// Davies-Bouldin index. Always `None` for a single cluster.
    pub validity: Option<f32>,
}

impl Clustering {
    fn from_partition(partition: Partition, validity: Option<f32>) -> Self {
        Self {
            num_clusters: partition.num_clusters(),
            prototypes: partition.prototypes,
            assignments: partition.assignments,
            error: partition.error,
            validity,
        }
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_clusters];
        for &label in &self.assignments {
            if let Some(size) = sizes.get_mut(label) {
                *size += 1;
            }
        }
        sizes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClusteringEntry {
    Clustered(Clustering),
    /// Placeholder for a cluster count where every trial was degenerate.
    NoValidTrial {
        num_clusters: usize,
        num_trials: usize,
    },
}

impl ClusteringEntry {
    pub fn num_clusters(&self) -> usize {
        match self {
            ClusteringEntry::Clustered(clustering) => clustering.num_clusters,
            ClusteringEntry::NoValidTrial { num_clusters, .. } => *num_clusters,
        }
    }

    pub fn clustering(&self) -> Option<&Clustering> {
        match self {
            ClusteringEntry::Clustered(clustering) => Some(clustering),
            ClusteringEntry::NoValidTrial { .. } => None,
        }
    }
}

/// One row of [`ResultTable::summary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub num_clusters: usize,
    pub error: Option<f32>,
    pub validity: Option<f32>,
    pub cluster_sizes: Vec<usize>,
}

/// Per-k results of a sweep, for k = 1..=max_clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    entries: Vec<ClusteringEntry>,
}

impl ResultTable {
    pub fn max_clusters(&self) -> usize {
        self.entries.len()
    }

    /// Entry for `num_clusters` (1-based).
    pub fn get(&self, num_clusters: usize) -> Option<&ClusteringEntry> {
        num_clusters
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
    }

    pub fn clustering(&self, num_clusters: usize) -> Option<&Clustering> {
        self.get(num_clusters).and_then(|entry| entry.clustering())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusteringEntry> {
        self.entries.iter()
    }

    pub fn prototypes_by_k(&self) -> Vec<Option<&Array2<f32>>> {
        self.entries
            .iter()
            .map(|entry| entry.clustering().map(|c| &c.prototypes))
            .collect()
    }

    pub fn assignments_by_k(&self) -> Vec<Option<&[usize]>> {
        self.entries
            .iter()
            .map(|entry| entry.clustering().map(|c| c.assignments.as_slice()))
            .collect()
    }

    pub fn errors_by_k(&self) -> Vec<Option<f32>> {
        self.entries
            .iter()
            .map(|entry| entry.clustering().map(|c| c.error))
            .collect()
    }

    pub fn validity_by_k(&self) -> Vec<Option<f32>> {
        self.entries
            .iter()
            .map(|entry| entry.clustering().and_then(|c| c.validity))
            .collect()
    }

    pub fn summary(&self) -> Vec<SummaryRow> {
        self.entries
            .iter()
            .map(|entry| SummaryRow {
                num_clusters: entry.num_clusters(),
                error: entry.clustering().map(|c| c.error),
                validity: entry.clustering().and_then(|c| c.validity),
                cluster_sizes: entry
                    .clustering()
                    .map(|c| c.cluster_sizes())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Sweeps k = 1..=max_clusters over one dataset.
pub struct ClusterSweep<P: Partitioner = LloydPartitioner> {
    config: ClusteringConfig,
    partitioner: P,
}

impl ClusterSweep<LloydPartitioner> {
    pub fn new(config: ClusteringConfig) -> Self {
        let partitioner = LloydPartitioner::new(config.init_method);
        Self {
            config,
            partitioner,
        }
    }
}

impl<P: Partitioner> ClusterSweep<P> {
    pub fn with_partitioner<Q: Partitioner>(self, partitioner: Q) -> ClusterSweep<Q> {
        ClusterSweep {
            config: self.config,
            partitioner,
        }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    fn validate(&self, dataset: &Dataset) -> Result<usize> {
        let max_clusters = self.config.max_clusters_for(dataset.num_points());
        if max_clusters == 0 {
            return Err(Error::InvalidInput(
                "max_clusters must be positive".to_string(),
            ));
        }
        if max_clusters > dataset.num_points() {
            return Err(Error::InvalidInput(format!(
                "max_clusters {} exceeds the number of data points {}",
                max_clusters,
                dataset.num_points()
            )));
        }
        if self.config.num_trials == 0 {
            return Err(Error::InvalidInput(
                "num_trials must be positive".to_string(),
            ));
        }
        if self.config.max_iteration == 0 {
            return Err(Error::InvalidInput(
                "max_iteration must be positive".to_string(),
            ));
        }
        if !self.config.norm_order.is_finite() || self.config.norm_order <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "norm_order must be a positive number, got {}",
                self.config.norm_order
            )));
        }
        Ok(max_clusters)
    }

    pub fn run(
        &self,
        dataset: &Dataset,
        observer: &mut dyn ProgressObserver,
    ) -> Result<ResultTable> {
        let max_clusters = self.validate(dataset)?;
        let base_seed = self.config.seed.unwrap_or_else(rand::random);
        info!(
            "Sweeping k = 1..={} over {} points of dimension {} ({} trials per k, seed {})",
            max_clusters,
            dataset.num_points(),
            dataset.dimension(),
            self.config.num_trials,
            base_seed
        );

        let validity_index = DaviesBouldin::new(self.config.norm_order);
        let selector = MultiRestartSelector::new(
            &self.partitioner,
            self.config.num_trials,
            self.config.max_iteration,
            base_seed,
        )
        .with_parallel(self.config.parallel);

        let mut entries = Vec::with_capacity(max_clusters);
        entries.push(ClusteringEntry::Clustered(Clustering::from_partition(
            baseline(dataset)?,
            None,
        )));
        observer.on_clustering(&entries[0]);

        for num_clusters in 2..=max_clusters {
            let entry = match selector.select(dataset, num_clusters, observer) {
                Ok(selection) => {
                    let partition = selection.partition;
                    let validity = validity_index.score(
                        dataset.view(),
                        partition.prototypes.view(),
                        &partition.assignments,
                    );
                    ClusteringEntry::Clustered(Clustering::from_partition(partition, validity))
                }
                Err(Error::NoValidTrial {
                    num_clusters,
                    num_trials,
                }) => {
                    warn!(
                        "No valid clustering for k={} after {} trials",
                        num_clusters, num_trials
                    );
                    ClusteringEntry::NoValidTrial {
                        num_clusters,
                        num_trials,
                    }
                }
                Err(e) => return Err(e),
            };
            observer.on_clustering(&entry);
            entries.push(entry);
        }

        Ok(ResultTable { entries })
    }
}

/// Sweeps k = 1..=max_clusters with the Lloyd partitioner. Progress is logged when
/// `config.verbose` is set.
pub fn compute_clusterings(
    input: impl IntoDataset,
    config: &ClusteringConfig,
) -> Result<ResultTable> {
    let dataset = input.into_dataset()?;
    let sweep = ClusterSweep::new(config.clone());
    if config.verbose {
        let mut observer = LoggingObserver::new(config.max_clusters_for(dataset.num_points()));
        sweep.run(&dataset, &mut observer)
    } else {
        sweep.run(&dataset, &mut NoopObserver)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{array, ArrayView2};

    use super::*;

    fn two_pairs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![10.0, 0.0],
            vec![10.0, 1.0],
        ]
    }

    #[derive(Default)]
    struct CountingObserver {
        trials: usize,
        clusterings: Vec<usize>,
    }

    impl ProgressObserver for CountingObserver {
        fn on_trial(&mut self, _num_clusters: usize, _trial: usize, _error: Option<f32>) {
            self.trials += 1;
        }

        fn on_clustering(&mut self, entry: &ClusteringEntry) {
            self.clusterings.push(entry.num_clusters());
        }
    }

    struct AlwaysDegenerate;

    impl Partitioner for AlwaysDegenerate {
        fn partition(
            &self,
            _data: ArrayView2<'_, f32>,
            num_clusters: usize,
            _max_iteration: usize,
            _seed: u64,
        ) -> anyhow::Result<Partition> {
            Err(anyhow::anyhow!("cannot build {} clusters", num_clusters))
        }
    }

    #[test]
    fn test_two_separated_pairs() {
        let config = ClusteringConfig::default().with_num_trials(20).with_seed(42);
        let table = compute_clusterings(two_pairs(), &config).expect("sweep should succeed");

        // ceil(sqrt(4)) = 2
        assert_eq!(table.max_clusters(), 2);

        let one = table.clustering(1).expect("k=1 always has a clustering");
        assert_eq!(one.validity, None);
        assert_abs_diff_eq!(one.error, 101.0, epsilon = 1e-3);

        let two = table.clustering(2).expect("k=2 should have a clustering");
        assert_eq!(two.prototypes.nrows(), 2);
        assert_abs_diff_eq!(two.error, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(
            two.validity.expect("validity should be defined"),
            0.1,
            epsilon = 1e-5
        );
        assert_eq!(two.cluster_sizes(), vec![2, 2]);
    }

    #[test]
    fn test_result_tables() {
        let config = ClusteringConfig::default()
            .with_max_clusters(3)
            .with_num_trials(5)
            .with_seed(9);
        let table = compute_clusterings(
            array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0], [5.0, 8.0]],
            &config,
        )
        .expect("sweep should succeed");

        let prototypes = table.prototypes_by_k();
        let assignments = table.assignments_by_k();
        let errors = table.errors_by_k();
        let validity = table.validity_by_k();
        assert_eq!(prototypes.len(), 3);
        assert_eq!(assignments.len(), 3);
        assert_eq!(errors.len(), 3);
        assert_eq!(validity.len(), 3);
        assert_eq!(validity[0], None);

        for (idx, (prototypes, assignments)) in
            prototypes.iter().zip(assignments.iter()).enumerate()
        {
            let k = idx + 1;
            let prototypes = prototypes.expect("every k should have a clustering");
            let assignments = assignments.expect("every k should have a clustering");
            assert_eq!(prototypes.nrows(), k);
            assert_eq!(assignments.len(), 5);
            assert!(assignments.iter().all(|&label| label < k));
            assert!(errors[idx].expect("error should be present") >= 0.0);
        }
    }

    #[test]
    fn test_singletons_have_undefined_validity() {
        let config = ClusteringConfig::default().with_max_clusters(3).with_seed(5);
        let table = compute_clusterings(
            vec![vec![0.0, 0.0], vec![4.0, 1.0], vec![9.0, 9.0]],
            &config,
        )
        .expect("sweep should succeed");

        let three = table.clustering(3).expect("k=3 should have a clustering");
        assert_eq!(three.cluster_sizes(), vec![1, 1, 1]);
        assert_eq!(three.error, 0.0);
        assert_eq!(three.validity, None);
    }

    #[test]
    fn test_missing_dimension_baseline() {
        let config = ClusteringConfig::default().with_max_clusters(1);
        let table = compute_clusterings(
            vec![
                vec![1.0, f32::NAN],
                vec![2.0, f32::NAN],
                vec![6.0, f32::NAN],
            ],
            &config,
        )
        .expect("sweep should succeed");

        let one = table.clustering(1).expect("k=1 always has a clustering");
        assert_abs_diff_eq!(one.prototypes[[0, 0]], 3.0, epsilon = 1e-6);
        assert!(one.prototypes[[0, 1]].is_nan());
        assert_abs_diff_eq!(one.error, 4.0 + 1.0 + 9.0, epsilon = 1e-5);
    }

    #[test]
    fn test_missing_cells_with_two_clusters() {
        let config = ClusteringConfig::default()
            .with_max_clusters(2)
            .with_num_trials(20)
            .with_seed(7);
        let table = compute_clusterings(
            vec![
                vec![0.0, 0.0],
                vec![0.0, f32::NAN],
                vec![f32::NAN, 0.0],
                vec![1.0, 1.0],
                vec![10.0, 10.0],
                vec![10.0, f32::NAN],
                vec![f32::NAN, 10.0],
                vec![11.0, 11.0],
            ],
            &config,
        )
        .expect("sweep should succeed");

        let two = table.clustering(2).expect("k=2 should have a clustering");
        let left = two.assignments[0];
        let right = two.assignments[4];
        assert_ne!(left, right);
        assert_eq!(two.assignments, vec![left, left, left, left, right, right, right, right]);
        assert_eq!(two.cluster_sizes(), vec![4, 4]);

        // Prototypes average the finite cells only: (1/3, 1/3) and (31/3, 31/3).
        assert_abs_diff_eq!(two.prototypes[[left, 0]], 1.0 / 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(two.prototypes[[left, 1]], 1.0 / 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(two.prototypes[[right, 0]], 31.0 / 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(two.prototypes[[right, 1]], 31.0 / 3.0, epsilon = 1e-5);

        // Per cluster: 2/9 + 1/9 + 1/9 + 8/9.
        assert_abs_diff_eq!(two.error, 8.0 / 3.0, epsilon = 1e-4);

        // S = sqrt(1/3) for both clusters and M = 10 * sqrt(2).
        let expected = 2.0 * (1.0f32 / 3.0).sqrt() / (10.0 * 2.0f32.sqrt());
        assert_abs_diff_eq!(
            two.validity.expect("validity should be defined"),
            expected,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_cluster_sizes_ignore_out_of_range_labels() {
        let clustering = Clustering {
            num_clusters: 2,
            prototypes: array![[0.0], [1.0]],
            assignments: vec![0, 1, 1, 5],
            error: 0.0,
            validity: None,
        };
        assert_eq!(clustering.cluster_sizes(), vec![1, 2]);
    }

    #[test]
    fn test_same_seed_is_idempotent() {
        let data = utils::test_utils::generate_blobs(
            &[vec![0.0, 0.0], vec![5.0, 5.0], vec![10.0, 0.0]],
            12,
            2.0,
            21,
        );
        let config = ClusteringConfig::default().with_seed(314);
        let first = compute_clusterings(data.view(), &config).expect("sweep should succeed");
        let second = compute_clusterings(data.view(), &config).expect("sweep should succeed");
        assert_eq!(first, second);

        let parallel = compute_clusterings(data.view(), &config.clone().with_parallel(true))
            .expect("sweep should succeed");
        assert_eq!(first, parallel);
    }

    #[test]
    fn test_observer_sees_every_trial() {
        let dataset = Dataset::from_rows(two_pairs()).expect("dataset should build");
        let sweep = ClusterSweep::new(ClusteringConfig::default().with_num_trials(4).with_seed(1));
        let mut observer = CountingObserver::default();
        let with_observer = sweep.run(&dataset, &mut observer).expect("sweep should succeed");
        let without_observer = sweep
            .run(&dataset, &mut NoopObserver)
            .expect("sweep should succeed");

        assert_eq!(observer.trials, 4);
        assert_eq!(observer.clusterings, vec![1, 2]);
        assert_eq!(with_observer, without_observer);
    }

    #[test]
    fn test_no_valid_trial_is_recorded() {
        let dataset = Dataset::from_rows(two_pairs()).expect("dataset should build");
        let sweep = ClusterSweep::new(ClusteringConfig::default().with_num_trials(3))
            .with_partitioner(AlwaysDegenerate);
        let table = sweep
            .run(&dataset, &mut NoopObserver)
            .expect("sweep should succeed");

        assert!(table.clustering(1).is_some());
        assert_eq!(
            table.get(2),
            Some(&ClusteringEntry::NoValidTrial {
                num_clusters: 2,
                num_trials: 3
            })
        );
        assert_eq!(table.errors_by_k()[1], None);
        assert_eq!(table.summary()[1].cluster_sizes, Vec::<usize>::new());
    }

    #[test]
    fn test_invalid_parameters() {
        let data = two_pairs();
        let cases = [
            ClusteringConfig::default().with_max_clusters(0),
            ClusteringConfig::default().with_max_clusters(5),
            ClusteringConfig::default().with_num_trials(0),
            ClusteringConfig {
                max_iteration: 0,
                ..Default::default()
            },
            ClusteringConfig {
                norm_order: 0.0,
                ..Default::default()
            },
            ClusteringConfig {
                norm_order: f32::NAN,
                ..Default::default()
            },
        ];
        for config in cases {
            let result = compute_clusterings(data.clone(), &config);
            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "expected invalid input for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_empty_input() {
        let result = compute_clusterings(Vec::<Vec<f32>>::new(), &ClusteringConfig::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_summary_serializes() {
        let config = ClusteringConfig::default().with_num_trials(20).with_seed(42);
        let table = compute_clusterings(two_pairs(), &config).expect("sweep should succeed");
        let summary = table.summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].cluster_sizes, vec![4]);
        assert_eq!(summary[0].validity, None);

        let yaml = serde_yaml::to_string(&summary).expect("summary should serialize");
        assert!(yaml.contains("num_clusters: 2"));
    }
}
