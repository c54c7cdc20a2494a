use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::distance::{kth_neighbor_distances, region_query};
use crate::error::{ClusterError, Result};
use crate::{Labels, Matrix, NOISE};

#[derive(Clone, Debug)]
pub struct DBSCAN {
    pub labels: Option<Labels>,
    pub core_sample_indices: Option<Vec<usize>>,
    eps: f64,
    min_samples: usize,
}

impl DBSCAN {
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self {
            labels: None,
            core_sample_indices: None,
            eps,
            min_samples,
        }
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        crate::check_non_empty(x)?;
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(ClusterError::invalid("eps", self.eps, "must be finite and > 0"));
        }
        if self.min_samples == 0 {
            return Err(ClusterError::invalid("min_samples", self.min_samples, "must be >= 1"));
        }

        let n_samples = x.nrows();
        let neighborhoods: Vec<Vec<usize>> =
            (0..n_samples).map(|i| region_query(x, i, self.eps)).collect();
        let is_core: Vec<bool> = neighborhoods
            .iter()
            .map(|neighbors| neighbors.len() >= self.min_samples)
            .collect();

        let mut labels = Labels::from_elem(n_samples, NOISE);
        let mut current_cluster = 0;
        let mut queue = VecDeque::new();

        for start in 0..n_samples {
            if !is_core[start] || labels[start] != NOISE {
                continue;
            }

            labels[start] = current_cluster;
            queue.extend(neighborhoods[start].iter().copied());

            // Core points keep expanding; border points are claimed by the
            // first cluster that reaches them.
            while let Some(idx) = queue.pop_front() {
                if labels[idx] != NOISE {
                    continue;
                }
                labels[idx] = current_cluster;
                if is_core[idx] {
                    queue.extend(
                        neighborhoods[idx]
                            .iter()
                            .copied()
                            .filter(|&nn| labels[nn] == NOISE),
                    );
                }
            }

            current_cluster += 1;
        }

        let core_samples: Vec<usize> = (0..n_samples).filter(|&i| is_core[i]).collect();
        debug!(
            eps = self.eps,
            min_samples = self.min_samples,
            n_clusters = current_cluster,
            n_core = core_samples.len(),
            n_noise = labels.iter().filter(|&&l| l == NOISE).count(),
            "dbscan fit finished"
        );

        self.labels = Some(labels);
        self.core_sample_indices = Some(core_samples);

        Ok(())
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> Result<Labels> {
        self.fit(x)?;
        self.labels
            .clone()
            .ok_or(ClusterError::NotFitted { model: "DBSCAN" })
    }

    pub fn n_clusters(&self) -> Option<usize> {
        self.labels.as_ref().map(count_clusters)
    }

    pub fn n_noise_points(&self) -> Option<usize> {
        self.labels.as_ref().map(count_noise)
    }

    pub fn is_core_sample(&self, sample_idx: usize) -> Option<bool> {
        self.core_sample_indices
            .as_ref()
            .map(|core_indices| core_indices.binary_search(&sample_idx).is_ok())
    }
}

/// Distinct non-noise cluster ids.
pub(crate) fn count_clusters(labels: &Labels) -> usize {
    labels
        .iter()
        .filter(|&&l| l != NOISE)
        .collect::<HashSet<_>>()
        .len()
}

pub(crate) fn count_noise(labels: &Labels) -> usize {
    labels.iter().filter(|&&l| l == NOISE).count()
}

/// Reads `eps` off the sorted k-distance curve at the 95th percentile.
///
/// `k` plays the role of `min_samples`: each point counts as its own first
/// neighbour.
pub fn suggest_eps(x: &Matrix, k: usize) -> Result<f64> {
    crate::check_non_empty(x)?;
    if k == 0 || k > x.nrows() {
        return Err(ClusterError::invalid(
            "k",
            k,
            format!("must be in 1..={} (n_samples)", x.nrows()),
        ));
    }

    let mut distances = kth_neighbor_distances(x, k);
    distances.sort_by(|a, b| a.total_cmp(b));

    let knee = ((0.95 * distances.len() as f64).floor() as usize).min(distances.len() - 1);
    let eps = distances[knee];
    debug!(k, eps, "suggested eps from k-distance curve");
    Ok(eps)
}
