use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::KMeansConfig;
use crate::distance::{euclidean, nearest_row, squared_euclidean};
use crate::error::{ClusterError, Result};
use crate::{Labels, Matrix, Vector};

/// Outcome of one k-means run: assignments, centroids and their objective.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansRun {
    pub labels: Labels,
    pub centroids: Matrix,
    /// Sum of squared distances from each point to its assigned centroid.
    pub inertia: f64,
    /// Lloyd iterations performed before convergence or `max_iter`.
    pub n_iter: usize,
}

#[derive(Clone, Debug)]
pub struct KMeans {
    pub cluster_centers: Option<Matrix>,
    pub labels: Option<Labels>,
    pub inertia: Option<f64>,
    pub n_iter: Option<usize>,
    n_clusters: usize,
    max_iter: usize,
    tolerance: f64,
    n_init: usize,
    random_state: u64,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self::from_config(&KMeansConfig {
            n_clusters,
            ..KMeansConfig::default()
        })
    }

    pub fn from_config(config: &KMeansConfig) -> Self {
        Self {
            cluster_centers: None,
            labels: None,
            inertia: None,
            n_iter: None,
            n_clusters: config.n_clusters,
            max_iter: config.max_iter,
            tolerance: config.tolerance,
            n_init: config.n_init,
            random_state: config.random_state,
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Fits with a generator seeded from `random_state`.
    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(self.random_state);
        self.fit_with_rng(x, &mut rng)
    }

    pub fn fit_with_rng<R: Rng + ?Sized>(&mut self, x: &Matrix, rng: &mut R) -> Result<()> {
        let run = self.cluster(x, rng)?;

        self.cluster_centers = Some(run.centroids);
        self.labels = Some(run.labels);
        self.inertia = Some(run.inertia);
        self.n_iter = Some(run.n_iter);

        Ok(())
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> Result<Labels> {
        self.fit(x)?;
        self.labels
            .clone()
            .ok_or(ClusterError::NotFitted { model: "KMeans" })
    }

    /// Runs every restart and keeps the one with the lowest inertia.
    /// Equal inertia keeps the earlier restart.
    pub fn cluster<R: Rng + ?Sized>(&self, x: &Matrix, rng: &mut R) -> Result<KMeansRun> {
        let mut best: Option<KMeansRun> = None;
        for (restart, run) in self.restarts(x, rng)?.into_iter().enumerate() {
            debug!(
                restart,
                n_iter = run.n_iter,
                inertia = run.inertia,
                "k-means restart finished"
            );
            if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        best.ok_or_else(|| ClusterError::invalid("n_init", self.n_init, "must be >= 1"))
    }

    /// Every restart's result, in restart order. Each restart gets its own
    /// generator seeded from a draw of `rng`.
    pub fn restarts<R: Rng + ?Sized>(&self, x: &Matrix, rng: &mut R) -> Result<Vec<KMeansRun>> {
        self.validate(x)?;
        let seeds: Vec<u64> = (0..self.n_init).map(|_| rng.r#gen()).collect();

        #[cfg(feature = "parallel")]
        let runs: Vec<KMeansRun> = {
            use rayon::prelude::*;
            seeds.par_iter().map(|&seed| self.single_run(x, seed)).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let runs: Vec<KMeansRun> = seeds.iter().map(|&seed| self.single_run(x, seed)).collect();

        Ok(runs)
    }

    pub fn predict(&self, x: &Matrix) -> Result<Labels> {
        let centroids = self.fitted_centers(x)?;
        Ok(assign(x, centroids))
    }

    /// Distance from every point to every centroid, shape `(n_samples, n_clusters)`.
    pub fn transform(&self, x: &Matrix) -> Result<Matrix> {
        let centroids = self.fitted_centers(x)?;

        let mut distances = Matrix::zeros((x.nrows(), centroids.nrows()));
        for i in 0..x.nrows() {
            for k in 0..centroids.nrows() {
                distances[[i, k]] = euclidean(&x.row(i), &centroids.row(k));
            }
        }

        Ok(distances)
    }

    fn fitted_centers(&self, x: &Matrix) -> Result<&Matrix> {
        let centroids = self
            .cluster_centers
            .as_ref()
            .ok_or(ClusterError::NotFitted { model: "KMeans" })?;

        if x.ncols() != centroids.ncols() {
            return Err(ClusterError::DimensionMismatch {
                expected: centroids.ncols(),
                got: x.ncols(),
            });
        }
        Ok(centroids)
    }

    fn validate(&self, x: &Matrix) -> Result<()> {
        crate::check_non_empty(x)?;
        if self.n_clusters == 0 {
            return Err(ClusterError::invalid("n_clusters", self.n_clusters, "must be >= 1"));
        }
        if self.n_clusters > x.nrows() {
            return Err(ClusterError::invalid(
                "n_clusters",
                self.n_clusters,
                format!("must be <= n_samples ({})", x.nrows()),
            ));
        }
        if self.n_init == 0 {
            return Err(ClusterError::invalid("n_init", self.n_init, "must be >= 1"));
        }
        if self.max_iter == 0 {
            return Err(ClusterError::invalid("max_iter", self.max_iter, "must be >= 1"));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(ClusterError::invalid("tolerance", self.tolerance, "must be finite and >= 0"));
        }
        Ok(())
    }

    fn single_run(&self, x: &Matrix, seed: u64) -> KMeansRun {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut centroids = init_plus_plus(x, self.n_clusters, &mut rng);
        let mut n_iter = 0;

        for _ in 0..self.max_iter {
            n_iter += 1;
            let labels = assign(x, &centroids);
            let updated = update_centroids(x, &labels, self.n_clusters, &mut rng);

            let shift = (&updated - &centroids).mapv(|d| d * d).sum().sqrt();
            centroids = updated;
            if shift < self.tolerance {
                break;
            }
        }

        let labels = assign(x, &centroids);
        let inertia = inertia(x, &labels, &centroids);
        KMeansRun {
            labels,
            centroids,
            inertia,
            n_iter,
        }
    }
}

/// k-means++ seeding. Keeps a running minimum of each point's squared
/// distance to the chosen centroids and samples the next one proportionally.
fn init_plus_plus<R: Rng + ?Sized>(x: &Matrix, k: usize, rng: &mut R) -> Matrix {
    let n = x.nrows();
    let mut centroids = Matrix::zeros((k, x.ncols()));
    centroids.row_mut(0).assign(&x.row(rng.gen_range(0..n)));

    let mut min_dist_sq = Vector::from_elem(n, f64::INFINITY);
    for c in 1..k {
        let previous = centroids.row(c - 1);
        for (i, point) in x.rows().into_iter().enumerate() {
            min_dist_sq[i] = min_dist_sq[i].min(squared_euclidean(&point, &previous));
        }

        let total = min_dist_sq.sum();
        let idx = if total > 0.0 {
            sample_weighted(&min_dist_sq, total, rng.r#gen::<f64>())
        } else {
            // Every point already coincides with a centroid.
            rng.gen_range(0..n)
        };
        centroids.row_mut(c).assign(&x.row(idx));
    }

    centroids
}

/// Inverse-CDF draw: first index whose cumulative weight exceeds `u * total`.
fn sample_weighted(weights: &Vector, total: f64, u: f64) -> usize {
    let target = u * total;
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            last_positive = i;
        }
        cumulative += w;
        if cumulative > target {
            return i;
        }
    }
    last_positive
}

fn assign(x: &Matrix, centroids: &Matrix) -> Labels {
    x.rows()
        .into_iter()
        .map(|point| nearest_row(&point, centroids).0 as i32)
        .collect()
}

/// Coordinate-wise mean of each cluster. Empty clusters are re-seeded to a
/// uniformly drawn point.
fn update_centroids<R: Rng + ?Sized>(x: &Matrix, labels: &Labels, k: usize, rng: &mut R) -> Matrix {
    let mut sums = Matrix::zeros((k, x.ncols()));
    let mut counts = vec![0usize; k];
    for (point, &label) in x.rows().into_iter().zip(labels.iter()) {
        let mut row = sums.row_mut(label as usize);
        row += &point;
        counts[label as usize] += 1;
    }

    for (c, &count) in counts.iter().enumerate() {
        if count > 0 {
            sums.row_mut(c).mapv_inplace(|v| v / count as f64);
        } else {
            let idx = rng.gen_range(0..x.nrows());
            debug!(cluster = c, point = idx, "re-seeding empty k-means cluster");
            sums.row_mut(c).assign(&x.row(idx));
        }
    }

    sums
}

fn inertia(x: &Matrix, labels: &Labels, centroids: &Matrix) -> f64 {
    x.rows()
        .into_iter()
        .zip(labels.iter())
        .map(|(point, &label)| squared_euclidean(&point, &centroids.row(label as usize)))
        .sum()
}
