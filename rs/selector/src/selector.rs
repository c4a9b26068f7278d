use log::debug;
use ndarray::Array2;
use quantization::prototype::nearest_prototype;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use utils::stats::column_finite_means;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::observer::ProgressObserver;
use crate::partition::{trial_seed, Partition, Partitioner};

/// Runs several independent trials for one cluster count and keeps the one with the lowest error.
///
/// Trials are compared with strict `<`, so on an exact tie the earlier trial wins. A degenerate
/// trial counts as `f32::MAX` and therefore never beats a valid one.
pub struct MultiRestartSelector<'a, P: Partitioner> {
    partitioner: &'a P,
    num_trials: usize,
    max_iteration: usize,
    base_seed: u64,
    parallel: bool,
}

/// The winning trial of a [`MultiRestartSelector`] run.
#[derive(Debug, Clone)]
pub struct Selection {
    pub partition: Partition,
    pub best_trial: usize,
    pub num_degenerate_trials: usize,
}

impl<'a, P: Partitioner> MultiRestartSelector<'a, P> {
    pub fn new(partitioner: &'a P, num_trials: usize, max_iteration: usize, base_seed: u64) -> Self {
        Self {
            partitioner,
            num_trials,
            max_iteration,
            base_seed,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn run_trial(&self, dataset: &Dataset, num_clusters: usize, trial: usize) -> Result<Partition> {
        let seed = trial_seed(self.base_seed, num_clusters, trial);
        let partition = self
            .partitioner
            .partition(dataset.view(), num_clusters, self.max_iteration, seed)
            .map_err(|e| Error::DegenerateTrial {
                num_clusters,
                trial,
                reason: e.to_string(),
            })?;

        let valid = partition.num_clusters() == num_clusters
            && partition.assignments.len() == dataset.num_points()
            && partition.assignments.iter().all(|&label| label < num_clusters)
            && partition.error.is_finite()
            && partition.error >= 0.0;
        if !valid {
            return Err(Error::DegenerateTrial {
                num_clusters,
                trial,
                reason: "partitioner returned an inconsistent clustering".to_string(),
            });
        }
        Ok(partition)
    }

    pub fn select(
        &self,
        dataset: &Dataset,
        num_clusters: usize,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Selection> {
        if num_clusters < 2 || num_clusters > dataset.num_points() {
            return Err(Error::InvalidInput(format!(
                "cluster count {} is outside [2, {}]",
                num_clusters,
                dataset.num_points()
            )));
        }
        if self.num_trials == 0 {
            return Err(Error::InvalidInput(
                "number of trials must be positive".to_string(),
            ));
        }

        let outcomes: Vec<Result<Partition>> = if self.parallel {
            (0..self.num_trials)
                .into_par_iter()
                .map(|trial| self.run_trial(dataset, num_clusters, trial))
                .collect()
        } else {
            (0..self.num_trials)
                .map(|trial| self.run_trial(dataset, num_clusters, trial))
                .collect()
        };

        let mut best: Option<(usize, Partition)> = None;
        let mut best_error = f32::MAX;
        let mut num_degenerate_trials = 0;
        for (trial, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(partition) => {
                    observer.on_trial(num_clusters, trial, Some(partition.error));
                    if partition.error < best_error {
                        best_error = partition.error;
                        best = Some((trial, partition));
                    }
                }
                Err(e) => {
                    debug!("{}", e);
                    observer.on_trial(num_clusters, trial, None);
                    num_degenerate_trials += 1;
                }
            }
        }

        match best {
            Some((best_trial, partition)) => Ok(Selection {
                partition,
                best_trial,
                num_degenerate_trials,
            }),
            None => Err(Error::NoValidTrial {
                num_clusters,
                num_trials: self.num_trials,
            }),
        }
    }
}

/// The one-cluster clustering: the prototype is the per-dimension mean of the finite values, every
/// point belongs to cluster 0, and the error is the sum of squared quantization errors.
pub fn baseline(dataset: &Dataset) -> Result<Partition> {
    let means = column_finite_means(dataset.view());
    let prototypes = Array2::from_shape_vec((1, dataset.dimension()), means)
        .map_err(|e| Error::InvalidInput(e.to_string()))?;
    let (_, quantization_errors) = nearest_prototype(prototypes.view(), dataset.view())
        .map_err(|e| Error::InvalidInput(e.to_string()))?;
    let error = quantization_errors
        .iter()
        .map(|&qerr| (qerr as f64).powi(2))
        .sum::<f64>() as f32;

    Ok(Partition {
        prototypes,
        assignments: vec![0; dataset.num_points()],
        error,
    })
}
