use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Generate a random vector with a given dimension
pub fn generate_random_vector(dimension: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    let mut vector = vec![];
    for _ in 0..dimension {
        vector.push(rng.gen::<f32>());
    }
    vector
}

// Generate `points_per_center` points around each center, uniformly within `spread` on every
// axis. Rows are grouped by center.
pub fn generate_blobs(
    centers: &[Vec<f32>],
    points_per_center: usize,
    spread: f32,
    seed: u64,
) -> Array2<f32> {
    let dimension = centers.first().map(|c| c.len()).unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut flattened = Vec::with_capacity(centers.len() * points_per_center * dimension);
    for center in centers {
        for _ in 0..points_per_center {
            for &c in center {
                flattened.push(c + rng.gen_range(-spread..=spread));
            }
        }
    }
    Array2::from_shape_vec((centers.len() * points_per_center, dimension), flattened)
        .expect("blob shape is consistent by construction")
}
