//! Unsupervised clustering of fixed-dimensionality feature vectors.
//!
//! - [`KMeans`]: k-means++ seeding, Lloyd refinement, best-of-n restarts
//! - [`DBSCAN`]: density-based clustering with noise detection
//! - [`ParameterSearch`]: grid search over DBSCAN parameters scored against known labels
//! - [`metrics`]: purity, ARI, NMI, homogeneity/completeness/V-measure, silhouette
//!
//! ```rust
//! use clusterlab::{KMeans, DBSCAN, metrics};
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
//! let truth = array![0, 0, 1, 1];
//!
//! let mut kmeans = KMeans::new(2).random_state(7);
//! let labels = kmeans.fit_predict(&x).unwrap();
//! let report = metrics::evaluate(&labels, &truth, &x).unwrap();
//! assert!((report.adjusted_rand_index - 1.0).abs() < 1e-12);
//!
//! let labels = DBSCAN::new(1.5, 2).fit_predict(&x).unwrap();
//! assert_eq!(labels.len(), 4);
//! ```

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod cluster;
pub mod config;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod metrics;
pub mod preprocessing;

pub use cluster::{
    AutoDbscan, Candidate, DBSCAN, EpsGrid, KMeans, KMeansRun, MinSamplesGrid, ParameterSearch,
    SearchOutcome, suggest_eps,
};
pub use config::{ClusteringConfig, DbscanConfig, KMeansConfig, SearchConfig};
pub use dataset::Dataset;
pub use error::{ClusterError, Result};
pub use metrics::{ClusterPurity, Evaluation};
pub use preprocessing::StandardScaler;

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;
pub type Labels = Array1<i32>;

/// Label reserved for points that belong to no cluster.
pub const NOISE: i32 = -1;

/// Rejects matrices with no samples or no features.
pub(crate) fn check_non_empty(x: &Matrix) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ClusterError::EmptyInput);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_types_work() {
        let labels = Labels::from_elem(5, NOISE);
        let mat = Matrix::zeros((3, 4));
        assert_eq!(labels.len(), 5);
        assert!(labels.iter().all(|&l| l == -1));
        assert_eq!(mat.shape(), &[3, 4]);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        assert_eq!(check_non_empty(&Matrix::zeros((0, 3))), Err(ClusterError::EmptyInput));
        assert_eq!(check_non_empty(&Matrix::zeros((3, 0))), Err(ClusterError::EmptyInput));
        assert!(check_non_empty(&Matrix::zeros((1, 1))).is_ok());
    }
}
