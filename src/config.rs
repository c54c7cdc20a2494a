//! Serializable clustering settings.
//!
//! Every field carries a default, so a TOML document only needs to name
//! what it overrides:
//!
//! ```rust
//! use clusterlab::ClusteringConfig;
//!
//! let config = ClusteringConfig::from_toml_str(
//!     "[kmeans]\nn_clusters = 10\n\n[search]\ntarget_clusters = 10\n",
//! )
//! .unwrap();
//! assert_eq!(config.kmeans.n_clusters, 10);
//! assert_eq!(config.kmeans.n_init, 5);
//! assert!(config.dbscan.eps.is_none());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KMeansConfig {
    pub n_clusters: usize,
    pub max_iter: usize,
    /// Stop once the Frobenius norm of the centroid displacement drops below this.
    pub tolerance: f64,
    /// Number of independent k-means++ restarts; the lowest inertia wins.
    pub n_init: usize,
    pub random_state: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 8,
            max_iter: 300,
            tolerance: 1e-4,
            n_init: 5,
            random_state: 42,
        }
    }
}

/// Fixed DBSCAN parameters. A missing `eps` means "search for it".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DbscanConfig {
    pub eps: Option<f64>,
    /// Defaults to twice the feature dimensionality when absent.
    pub min_samples: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub target_clusters: usize,
    /// Largest acceptable fraction of noise points, in `[0, 1]`.
    pub max_noise: f64,
    pub eps_start: f64,
    pub eps_stop: f64,
    pub eps_step: f64,
    pub min_samples_start: Option<usize>,
    pub min_samples_stop: Option<usize>,
    pub min_samples_step: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            target_clusters: 20,
            max_noise: 0.15,
            eps_start: 0.1,
            eps_stop: 1.0,
            eps_step: 0.05,
            min_samples_start: None,
            min_samples_stop: None,
            min_samples_step: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ClusteringConfig {
    pub kmeans: KMeansConfig,
    pub dbscan: DbscanConfig,
    pub search: SearchConfig,
}

impl ClusteringConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| ClusterError::Config(err.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| ClusterError::Config(err.to_string()))
    }
}
