use ndarray::{Array2, ArrayView1, Axis};

/// Squared euclidean distance
pub fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Scale every row to unit length; zero rows are left as is
///
/// After this, euclidean distance orders pairs the same way cosine
/// similarity does.
pub fn normalize_rows(mut data: Array2<f64>) -> Array2<f64> {
    for mut row in data.axis_iter_mut(Axis(0)) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|x| x / norm);
        }
    }
    data
}

/// Number of pairwise distinct rows
pub fn distinct_rows(data: &Array2<f64>) -> usize {
    let mut seen: Vec<ArrayView1<f64>> = Vec::new();
    for row in data.axis_iter(Axis(0)) {
        if !seen.iter().any(|earlier| *earlier == row) {
            seen.push(row);
        }
    }
    seen.len()
}
