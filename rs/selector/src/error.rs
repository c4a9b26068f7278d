use thiserror::Error;

/// Errors returned while sweeping cluster counts.
#[derive(Debug, Error)]
pub enum Error {
    /// The dataset or the parameters can't produce a meaningful sweep.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A single k-means trial produced no usable clustering (e.g. a cluster ended up empty).
    /// The selector absorbs these; they only surface through logs and observers.
    #[error("trial {trial} for {num_clusters} clusters is degenerate: {reason}")]
    DegenerateTrial {
        num_clusters: usize,
        trial: usize,
        reason: String,
    },

    /// Every trial for a cluster count was degenerate.
    #[error("all {num_trials} trials for {num_clusters} clusters were degenerate")]
    NoValidTrial {
        num_clusters: usize,
        num_trials: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
