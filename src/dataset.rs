use ndarray::{Axis, s};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Normal;
use rand::Rng;

use crate::error::{ClusterError, Result};
use crate::{Labels, Matrix};

/// Reduced feature vectors paired with their external labels.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Matrix,
    pub targets: Labels,
}

impl Dataset {
    pub fn new(features: Matrix, targets: Labels) -> Result<Self> {
        crate::check_non_empty(&features)?;
        if features.nrows() != targets.len() {
            return Err(ClusterError::LengthMismatch {
                expected: features.nrows(),
                got: targets.len(),
            });
        }

        Ok(Self { features, targets })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Number of distinct external labels.
    pub fn n_classes(&self) -> usize {
        let mut seen: Vec<i32> = self.targets.to_vec();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Gaussian blobs around each row of `centers`, `n_per_center` points
    /// each. Targets are the center's row index.
    pub fn make_blobs<R: Rng + ?Sized>(
        centers: &Matrix,
        n_per_center: usize,
        std: f64,
        rng: &mut R,
    ) -> Result<Self> {
        crate::check_non_empty(centers)?;
        if n_per_center == 0 {
            return Err(ClusterError::invalid("n_per_center", n_per_center, "must be >= 1"));
        }
        if !(std.is_finite() && std >= 0.0) {
            return Err(ClusterError::invalid("std", std, "must be finite and >= 0"));
        }
        let noise = Normal::new(0.0, std)
            .map_err(|_| ClusterError::invalid("std", std, "must be finite and >= 0"))?;

        let n_features = centers.ncols();
        let n_samples = centers.nrows() * n_per_center;
        let mut features = Matrix::random_using((n_samples, n_features), noise, rng);
        let mut targets = Labels::zeros(n_samples);

        for (c, center) in centers.axis_iter(Axis(0)).enumerate() {
            let rows = s![c * n_per_center..(c + 1) * n_per_center, ..];
            for mut row in features.slice_mut(rows).rows_mut() {
                row += &center;
            }
            targets
                .slice_mut(s![c * n_per_center..(c + 1) * n_per_center])
                .fill(c as i32);
        }

        Ok(Self { features, targets })
    }
}
