pub mod text;

use anyhow::Result;

pub struct Row<'a> {
    pub id: u64,
    pub data: &'a [f32],
}

pub trait Input {
    // Return true if there are more rows to read
    fn has_next(&self) -> bool;

    // Return the next row of data
    fn next(&mut self) -> Row<'_>;

    // Reset the state of the input to the beginning
    // This is helpful when we want to do multiple passes over the same input
    fn reset(&mut self);

    // Return the number of rows in the input
    fn num_rows(&self) -> usize;

    // Return the number of values in every row
    fn dimension(&self) -> usize;
}

/// Drain an input from the beginning into a row-major flattened buffer.
pub fn read_flattened(input: &mut impl Input) -> Result<Vec<f32>> {
    input.reset();
    let mut flattened = Vec::with_capacity(input.num_rows() * input.dimension());
    while input.has_next() {
        let row = input.next();
        flattened.extend_from_slice(row.data);
    }
    Ok(flattened)
}
