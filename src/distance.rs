//! Euclidean geometry over rows of a [`Matrix`](crate::Matrix).

use ndarray::ArrayView1;

use crate::Matrix;

pub fn squared_euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
}

pub fn euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Index of the row of `centers` closest to `point`. Ties go to the lowest index.
pub fn nearest_row(point: &ArrayView1<f64>, centers: &Matrix) -> (usize, f64) {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (k, center) in centers.rows().into_iter().enumerate() {
        let dist = squared_euclidean(point, &center);
        if dist < best_dist {
            best_dist = dist;
            best = k;
        }
    }
    (best, best_dist)
}

/// Indices of every row within `eps` of row `idx`, the row itself included,
/// in row order.
pub fn region_query(x: &Matrix, idx: usize, eps: f64) -> Vec<usize> {
    let point = x.row(idx);
    x.rows()
        .into_iter()
        .enumerate()
        .filter(|(_, other)| euclidean(&point, other) <= eps)
        .map(|(i, _)| i)
        .collect()
}

/// Distance from every row to its `k`-th nearest row, counting the row
/// itself as the first neighbour. Caller guarantees `1 <= k <= x.nrows()`.
pub fn kth_neighbor_distances(x: &Matrix, k: usize) -> Vec<f64> {
    let n = x.nrows();
    let mut dists = vec![0.0; n];
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let row = x.row(i);
        for (j, other) in x.rows().into_iter().enumerate() {
            dists[j] = euclidean(&row, &other);
        }
        let (_, kth, _) = dists.select_nth_unstable_by(k - 1, |a, b| a.total_cmp(b));
        out.push(*kth);
    }
    out
}
