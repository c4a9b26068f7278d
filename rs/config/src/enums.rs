use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// How a k-means trial picks its starting prototypes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, EnumIter)]
pub enum InitMethod {
    /// k distinct data points drawn uniformly at random.
    #[default]
    RandomSample,
    /// Every point gets a uniformly random label; prototypes are the label means.
    RandomLabels,
}
