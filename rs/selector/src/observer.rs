use log::{debug, info};

use crate::sweep::ClusteringEntry;

/// Progress callbacks of a sweep. Observers see results, they can't change them.
///
/// Trial callbacks arrive in trial order after all trials of a cluster count are done, also when
/// the trials ran in parallel.
pub trait ProgressObserver {
    /// `error` is `None` for a degenerate trial.
    fn on_trial(&mut self, _num_clusters: usize, _trial: usize, _error: Option<f32>) {}

    /// Called once per cluster count, after its validity score is known.
    fn on_clustering(&mut self, _entry: &ClusteringEntry) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Reports progress through the log facade.
#[derive(Debug, Default)]
pub struct LoggingObserver {
    max_clusters: usize,
}

impl LoggingObserver {
    pub fn new(max_clusters: usize) -> Self {
        Self { max_clusters }
    }
}

impl ProgressObserver for LoggingObserver {
    fn on_trial(&mut self, num_clusters: usize, trial: usize, error: Option<f32>) {
        match error {
            Some(error) => debug!("k={} trial {}: error {:.4}", num_clusters, trial, error),
            None => debug!("k={} trial {}: degenerate", num_clusters, trial),
        }
    }

    fn on_clustering(&mut self, entry: &ClusteringEntry) {
        match entry {
            ClusteringEntry::Clustered(clustering) => info!(
                "k={}/{}: error {:.4}, Davies-Bouldin {}",
                clustering.num_clusters,
                self.max_clusters,
                clustering.error,
                clustering
                    .validity
                    .map(|v| format!("{:.4}", v))
                    .unwrap_or_else(|| "undefined".to_string())
            ),
            ClusteringEntry::NoValidTrial {
                num_clusters,
                num_trials,
            } => info!(
                "k={}/{}: none of {} trials produced a valid clustering",
                num_clusters, self.max_clusters, num_trials
            ),
        }
    }
}
