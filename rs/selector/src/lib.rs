//! Pick a number of clusters for a fixed dataset.
//!
//! For every k in 1..=max_clusters, several randomized k-means trials are run and the one with the
//! lowest quantization error is kept. The winner of each k is scored with the Davies-Bouldin index
//! (lower is better). Nothing here decides on a "best" k: callers get the whole [`ResultTable`]
//! and read the error and validity curves themselves.
//!
//! ```no_run
//! use config::clustering::ClusteringConfig;
//! use selector::compute_clusterings;
//!
//! let data = vec![vec![0.0f32, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]];
//! let table = compute_clusterings(data, &ClusteringConfig::default().with_seed(42)).unwrap();
//! for row in table.summary() {
//!     println!("{} {:?} {:?}", row.num_clusters, row.error, row.validity);
//! }
//! ```

pub mod dataset;
pub mod error;
pub mod observer;
pub mod partition;
pub mod selector;
pub mod sweep;
pub mod validity;

pub use dataset::{Codebook, Dataset, IntoDataset, LabeledData};
pub use error::{Error, Result};
pub use observer::{LoggingObserver, NoopObserver, ProgressObserver};
pub use partition::{LloydPartitioner, Partition, Partitioner};
pub use selector::MultiRestartSelector;
pub use sweep::{compute_clusterings, ClusterSweep, Clustering, ClusteringEntry, ResultTable};
pub use validity::{davies_bouldin, DaviesBouldin};
