//! Clustering algorithms.
//!
//! - `KMeans`: k-means++ seeding, Lloyd refinement and best-of-n restarts
//! - `DBSCAN`: density-based clustering with noise labelling
//! - `ParameterSearch`: grid search for DBSCAN parameters against known labels
//! - `AutoDbscan`: DBSCAN that tunes its own parameters when none are given
//!
//! # Examples
//!
//! ## K-Means Clustering
//! ```rust
//! use clusterlab::KMeans;
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.0],
//!     [1.5, 2.0],
//!     [3.0, 4.0],
//!     [5.0, 7.0],
//!     [3.5, 5.0],
//!     [4.5, 5.0]
//! ];
//!
//! let mut kmeans = KMeans::new(2).max_iter(100).n_init(5).random_state(42);
//! let labels = kmeans.fit_predict(&x).unwrap();
//! assert_eq!(labels.len(), 6);
//!
//! let centers = kmeans.cluster_centers.as_ref().unwrap();
//! assert_eq!(centers.nrows(), 2);
//! println!("Inertia: {:.4}", kmeans.inertia.unwrap());
//! ```
//!
//! ## DBSCAN Clustering
//! ```rust
//! use clusterlab::{DBSCAN, NOISE};
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.0],
//!     [1.2, 1.1],
//!     [1.1, 1.2],
//!     [8.0, 8.0],
//!     [8.1, 8.1],
//!     [8.2, 7.9],
//!     [15.0, 1.0] // Outlier
//! ];
//!
//! let mut dbscan = DBSCAN::new(1.0, 2);
//! let labels = dbscan.fit_predict(&x).unwrap();
//!
//! assert_eq!(dbscan.n_clusters(), Some(2));
//! assert_eq!(labels[6], NOISE);
//! ```
//!
//! ## Parameter search
//! ```rust
//! use clusterlab::{MinSamplesGrid, ParameterSearch};
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.0], [0.05, 0.0], [0.0, 0.05], [3.0, 3.0], [3.05, 3.0], [3.0, 3.05]];
//! let truth = array![0, 0, 0, 1, 1, 1];
//!
//! let search = ParameterSearch::new(2, 0.1)
//!     .min_samples_grid(MinSamplesGrid { start: 2, stop: 4, step: 1 });
//! let (eps, min_samples) = search.search(&x, &truth).unwrap().unwrap();
//! assert!(eps > 0.0 && min_samples >= 2);
//! ```

mod auto;
mod dbscan;
mod kmeans;
mod search;

pub use auto::AutoDbscan;
pub use dbscan::{DBSCAN, suggest_eps};
pub use kmeans::{KMeans, KMeansRun};
pub use search::{Candidate, EpsGrid, MinSamplesGrid, ParameterSearch, SearchOutcome};

pub(crate) use dbscan::{count_clusters, count_noise};
