use ndarray::{Array2, ArrayView1, ArrayView2};
use utils::input::{read_flattened, Input};

use crate::error::{Error, Result};

/// An N x D matrix of measurements. Non-finite cells are missing values.
///
/// Construction guarantees at least one row and one column. The matrix is never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    data: Array2<f32>,
}

impl Dataset {
    pub fn new(data: Array2<f32>) -> Result<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(Error::InvalidInput(format!(
                "dataset must have at least one row and one column, got {} x {}",
                data.nrows(),
                data.ncols()
            )));
        }
        Ok(Self { data })
    }

    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let num_rows = rows.len();
        let dimension = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut flattened = Vec::with_capacity(num_rows * dimension);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(Error::InvalidInput(format!(
                    "row {} has {} values, expected {}",
                    idx,
                    row.len(),
                    dimension
                )));
            }
            flattened.extend(row);
        }
        Self::from_flattened(flattened, num_rows, dimension)
    }

    pub fn from_flattened(flattened: Vec<f32>, num_rows: usize, dimension: usize) -> Result<Self> {
        let data = Array2::from_shape_vec((num_rows, dimension), flattened)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        Self::new(data)
    }

    pub fn num_points(&self) -> usize {
        self.data.nrows()
    }

    pub fn dimension(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    pub fn row(&self, idx: usize) -> ArrayView1<'_, f32> {
        self.data.row(idx)
    }

    pub fn into_inner(self) -> Array2<f32> {
        self.data
    }
}

/// Measurements together with per-row labels and per-column names. Only the matrix takes part in
/// clustering.
#[derive(Debug, Clone)]
pub struct LabeledData {
    pub data: Array2<f32>,
    pub labels: Vec<String>,
    pub component_names: Vec<String>,
}

/// Prototype vectors of a trained map, laid out on a `rows x columns` grid. Clustering a codebook
/// clusters its prototypes.
#[derive(Debug, Clone)]
pub struct Codebook {
    pub prototypes: Array2<f32>,
    pub grid_shape: (usize, usize),
}

/// Normalizes a supported input shape into a [`Dataset`].
pub trait IntoDataset {
    fn into_dataset(self) -> Result<Dataset>;
}

impl IntoDataset for Dataset {
    fn into_dataset(self) -> Result<Dataset> {
        Ok(self)
    }
}

impl IntoDataset for Array2<f32> {
    fn into_dataset(self) -> Result<Dataset> {
        Dataset::new(self)
    }
}

impl IntoDataset for ArrayView2<'_, f32> {
    fn into_dataset(self) -> Result<Dataset> {
        Dataset::new(self.to_owned())
    }
}

impl IntoDataset for Vec<Vec<f32>> {
    fn into_dataset(self) -> Result<Dataset> {
        Dataset::from_rows(self)
    }
}

impl IntoDataset for LabeledData {
    fn into_dataset(self) -> Result<Dataset> {
        if !self.labels.is_empty() && self.labels.len() != self.data.nrows() {
            return Err(Error::InvalidInput(format!(
                "{} labels for {} rows",
                self.labels.len(),
                self.data.nrows()
            )));
        }
        if !self.component_names.is_empty() && self.component_names.len() != self.data.ncols() {
            return Err(Error::InvalidInput(format!(
                "{} component names for {} columns",
                self.component_names.len(),
                self.data.ncols()
            )));
        }
        Dataset::new(self.data)
    }
}

impl IntoDataset for Codebook {
    fn into_dataset(self) -> Result<Dataset> {
        let (rows, columns) = self.grid_shape;
        if rows * columns != self.prototypes.nrows() {
            return Err(Error::InvalidInput(format!(
                "grid {} x {} does not match {} prototypes",
                rows,
                columns,
                self.prototypes.nrows()
            )));
        }
        Dataset::new(self.prototypes)
    }
}

impl<I: Input> IntoDataset for &mut I {
    fn into_dataset(self) -> Result<Dataset> {
        let num_rows = self.num_rows();
        let dimension = self.dimension();
        let flattened = read_flattened(self).map_err(|e| Error::InvalidInput(e.to_string()))?;
        Dataset::from_flattened(flattened, num_rows, dimension)
    }
}
