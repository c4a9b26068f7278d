use ndarray::{ArrayView2, Axis};

/// Mean of the finite values. NaN when there are none.
pub fn finite_mean<I: IntoIterator<Item = f32>>(values: I) -> f32 {
    let (sum, count) = values
        .into_iter()
        .filter(|x| x.is_finite())
        .fold((0.0f64, 0usize), |(sum, count), x| (sum + x as f64, count + 1));
    if count == 0 {
        return f32::NAN;
    }
    (sum / count as f64) as f32
}

/// Per-column mean over finite values only. A column without finite values yields NaN.
pub fn column_finite_means(data: ArrayView2<'_, f32>) -> Vec<f32> {
    data.axis_iter(Axis(1))
        .map(|column| finite_mean(column.iter().copied()))
        .collect()
}
