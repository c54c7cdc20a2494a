use tracing::{info, warn};

use super::dbscan::{DBSCAN, suggest_eps};
use super::search::ParameterSearch;
use crate::config::ClusteringConfig;
use crate::error::{ClusterError, Result};
use crate::metrics::{Evaluation, evaluate};
use crate::{Labels, Matrix};

/// DBSCAN whose parameters are tuned on the data when not given.
///
/// Parameter resolution:
/// 1. a configured `eps` is used as is;
/// 2. otherwise the grid search runs (unless disabled);
/// 3. if that selects nothing, `eps` comes from [`suggest_eps`] with
///    `k = min_samples`.
///
/// `min_samples` defaults to twice the feature dimensionality.
#[derive(Clone, Debug)]
pub struct AutoDbscan {
    pub labels: Option<Labels>,
    /// `(eps, min_samples)` the last fit clustered with.
    pub parameters: Option<(f64, usize)>,
    eps: Option<f64>,
    min_samples: Option<usize>,
    search: Option<ParameterSearch>,
    points: Option<Matrix>,
}

impl AutoDbscan {
    pub fn new(search: ParameterSearch) -> Self {
        Self {
            labels: None,
            parameters: None,
            eps: None,
            min_samples: None,
            search: Some(search),
            points: None,
        }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            eps: config.dbscan.eps,
            min_samples: config.dbscan.min_samples,
            ..Self::new(ParameterSearch::from_config(&config.search))
        }
    }

    pub fn eps(mut self, eps: f64) -> Self {
        self.eps = Some(eps);
        self
    }

    pub fn min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = Some(min_samples);
        self
    }

    /// Skips the grid search and goes straight to the k-distance heuristic.
    pub fn without_search(mut self) -> Self {
        self.search = None;
        self
    }

    pub fn fit(&mut self, x: &Matrix, truth: &Labels) -> Result<Labels> {
        crate::check_non_empty(x)?;
        let min_samples = self.min_samples.unwrap_or(2 * x.ncols());

        let (eps, min_samples) = match self.eps {
            Some(eps) => (eps, min_samples),
            None => self.tune(x, truth, min_samples)?,
        };

        info!(eps, min_samples, "clustering with dbscan");
        let labels = DBSCAN::new(eps, min_samples).fit_predict(x)?;

        self.parameters = Some((eps, min_samples));
        self.labels = Some(labels.clone());
        self.points = Some(x.clone());
        Ok(labels)
    }

    fn tune(&self, x: &Matrix, truth: &Labels, min_samples: usize) -> Result<(f64, usize)> {
        if let Some(search) = &self.search {
            if let Some(found) = search.search(x, truth)? {
                return Ok(found);
            }
            warn!("parameter search found nothing, falling back to the k-distance heuristic");
        }
        let k = min_samples.min(x.nrows());
        Ok((suggest_eps(x, k)?, min_samples))
    }

    /// Scores the last fit against `truth`.
    pub fn evaluate(&self, truth: &Labels) -> Result<Evaluation> {
        match (&self.labels, &self.points) {
            (Some(labels), Some(points)) => evaluate(labels, truth, points),
            _ => Err(ClusterError::UndefinedMetric {
                metric: "evaluation",
                reason: "no clustering has run yet".to_string(),
            }),
        }
    }
}
