use tracing::{debug, info, warn};

use super::dbscan::{DBSCAN, count_clusters, count_noise};
use crate::config::SearchConfig;
use crate::error::{ClusterError, Result};
use crate::metrics::adjusted_rand_index;
use crate::{Labels, Matrix};

/// Arithmetic sequence `start, start + step, ...` strictly below `stop`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpsGrid {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for EpsGrid {
    fn default() -> Self {
        Self {
            start: 0.1,
            stop: 1.0,
            step: 0.05,
        }
    }
}

impl EpsGrid {
    pub fn values(&self) -> Vec<f64> {
        if !(self.step > 0.0) || !(self.stop > self.start) {
            return Vec::new();
        }
        let count = ((self.stop - self.start) / self.step).ceil() as usize;
        (0..count)
            .map(|i| self.start + i as f64 * self.step)
            .filter(|&eps| eps < self.stop)
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if !(self.start.is_finite() && self.start > 0.0) {
            return Err(ClusterError::invalid("eps_start", self.start, "must be finite and > 0"));
        }
        if !(self.stop.is_finite() && self.stop > self.start) {
            return Err(ClusterError::invalid(
                "eps_stop",
                self.stop,
                format!("must be finite and > eps_start ({})", self.start),
            ));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(ClusterError::invalid("eps_step", self.step, "must be finite and > 0"));
        }
        Ok(())
    }
}

/// `start, start + step, ...` strictly below `stop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinSamplesGrid {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

impl MinSamplesGrid {
    /// `max(5, d)` up to `min(50, 5d)` in steps of 5.
    pub fn for_dimensionality(n_features: usize) -> Self {
        Self {
            start: n_features.max(5),
            stop: (n_features * 5).min(50),
            step: 5,
        }
    }

    pub fn values(&self) -> Vec<usize> {
        (self.start..self.stop).step_by(self.step.max(1)).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.start == 0 {
            return Err(ClusterError::invalid("min_samples_start", self.start, "must be >= 1"));
        }
        if self.step == 0 {
            return Err(ClusterError::invalid("min_samples_step", self.step, "must be >= 1"));
        }
        Ok(())
    }
}

/// One evaluated grid cell that produced at least one cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub eps: f64,
    pub min_samples: usize,
    pub n_clusters: usize,
    pub noise_fraction: f64,
    /// ARI against the reference labels, noise excluded.
    pub ari: f64,
    /// Within the cluster-count window and under the noise ceiling.
    pub eligible: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub best: Option<Candidate>,
    /// Every cell with at least one cluster, in grid order.
    pub candidates: Vec<Candidate>,
}

impl SearchOutcome {
    pub fn best_parameters(&self) -> Option<(f64, usize)> {
        self.best.as_ref().map(|c| (c.eps, c.min_samples))
    }
}

/// Grid search over DBSCAN `(eps, min_samples)`.
///
/// A cell is eligible when its cluster count lies in
/// `[0.5 * target, 1.5 * target]` and its noise fraction is at most
/// `max_noise`. Among eligible cells the highest ARI wins; the first cell
/// in grid order (eps-major) keeps ties.
#[derive(Clone, Debug)]
pub struct ParameterSearch {
    target_clusters: usize,
    max_noise: f64,
    eps_grid: EpsGrid,
    min_samples_grid: Option<MinSamplesGrid>,
}

impl ParameterSearch {
    pub fn new(target_clusters: usize, max_noise: f64) -> Self {
        Self {
            target_clusters,
            max_noise,
            eps_grid: EpsGrid::default(),
            min_samples_grid: None,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        let mut search = Self::new(config.target_clusters, config.max_noise).eps_grid(EpsGrid {
            start: config.eps_start,
            stop: config.eps_stop,
            step: config.eps_step,
        });
        if let (Some(start), Some(stop)) = (config.min_samples_start, config.min_samples_stop) {
            search = search.min_samples_grid(MinSamplesGrid {
                start,
                stop,
                step: config.min_samples_step.unwrap_or(5),
            });
        }
        search
    }

    pub fn eps_grid(mut self, grid: EpsGrid) -> Self {
        self.eps_grid = grid;
        self
    }

    /// Overrides the grid derived from the data's dimensionality.
    pub fn min_samples_grid(mut self, grid: MinSamplesGrid) -> Self {
        self.min_samples_grid = Some(grid);
        self
    }

    pub fn is_eligible(&self, n_clusters: usize, noise_fraction: f64) -> bool {
        let target = self.target_clusters as f64;
        let n = n_clusters as f64;
        0.5 * target <= n && n <= 1.5 * target && noise_fraction <= self.max_noise
    }

    /// Best `(eps, min_samples)`, or `None` when no cell is eligible.
    pub fn search(&self, x: &Matrix, truth: &Labels) -> Result<Option<(f64, usize)>> {
        Ok(self.run(x, truth)?.best_parameters())
    }

    pub fn run(&self, x: &Matrix, truth: &Labels) -> Result<SearchOutcome> {
        self.validate(x, truth)?;

        let min_samples_grid = self
            .min_samples_grid
            .unwrap_or_else(|| MinSamplesGrid::for_dimensionality(x.ncols()));
        let min_samples_values = min_samples_grid.values();
        let cells: Vec<(f64, usize)> = self
            .eps_grid
            .values()
            .into_iter()
            .flat_map(|eps| min_samples_values.iter().map(move |&ms| (eps, ms)))
            .collect();
        debug!(
            cells = cells.len(),
            target = self.target_clusters,
            max_noise = self.max_noise,
            "starting dbscan parameter search"
        );

        #[cfg(feature = "parallel")]
        let evaluated: Vec<Option<Candidate>> = {
            use rayon::prelude::*;
            cells
                .par_iter()
                .map(|&(eps, ms)| self.evaluate_cell(x, truth, eps, ms))
                .collect::<Result<_>>()?
        };
        #[cfg(not(feature = "parallel"))]
        let evaluated: Vec<Option<Candidate>> = cells
            .iter()
            .map(|&(eps, ms)| self.evaluate_cell(x, truth, eps, ms))
            .collect::<Result<_>>()?;

        let candidates: Vec<Candidate> = evaluated.into_iter().flatten().collect();
        let mut best: Option<&Candidate> = None;
        for candidate in candidates.iter().filter(|c| c.eligible) {
            if best.is_none_or(|b| candidate.ari > b.ari) {
                info!(
                    eps = candidate.eps,
                    min_samples = candidate.min_samples,
                    n_clusters = candidate.n_clusters,
                    noise_fraction = candidate.noise_fraction,
                    ari = candidate.ari,
                    "new best dbscan parameters"
                );
                best = Some(candidate);
            }
        }

        let best = best.cloned();
        match &best {
            Some(c) => info!(eps = c.eps, min_samples = c.min_samples, "parameter search selected"),
            None => warn!(
                evaluated = candidates.len(),
                "no dbscan parameters satisfy the cluster-count and noise constraints"
            ),
        }

        Ok(SearchOutcome { best, candidates })
    }

    fn evaluate_cell(
        &self,
        x: &Matrix,
        truth: &Labels,
        eps: f64,
        min_samples: usize,
    ) -> Result<Option<Candidate>> {
        let labels = DBSCAN::new(eps, min_samples).fit_predict(x)?;
        let n_clusters = count_clusters(&labels);
        if n_clusters == 0 {
            return Ok(None);
        }

        let noise_fraction = count_noise(&labels) as f64 / labels.len() as f64;
        let ari = adjusted_rand_index(&labels, truth)?;
        Ok(Some(Candidate {
            eps,
            min_samples,
            n_clusters,
            noise_fraction,
            ari,
            eligible: self.is_eligible(n_clusters, noise_fraction),
        }))
    }

    fn validate(&self, x: &Matrix, truth: &Labels) -> Result<()> {
        crate::check_non_empty(x)?;
        if x.nrows() != truth.len() {
            return Err(ClusterError::LengthMismatch {
                expected: x.nrows(),
                got: truth.len(),
            });
        }
        if self.target_clusters == 0 {
            return Err(ClusterError::invalid("target_clusters", self.target_clusters, "must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.max_noise) {
            return Err(ClusterError::invalid("max_noise", self.max_noise, "must be in [0, 1]"));
        }
        self.eps_grid.validate()?;
        if let Some(grid) = &self.min_samples_grid {
            grid.validate()?;
        }
        Ok(())
    }
}
