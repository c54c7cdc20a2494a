use ndarray::Axis;

use crate::error::{ClusterError, Result};
use crate::{Matrix, Vector};

/// Per-feature standardisation to zero mean and unit variance.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    mean: Option<Vector>,
    std: Option<Vector>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<()> {
        crate::check_non_empty(data)?;
        let mean = data.mean_axis(Axis(0)).ok_or(ClusterError::EmptyInput)?;
        // Constant columns are only centred.
        let std = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        let (mean, std) = match (self.mean.as_ref(), self.std.as_ref()) {
            (Some(mean), Some(std)) => (mean, std),
            _ => return Err(ClusterError::NotFitted { model: "StandardScaler" }),
        };
        if data.ncols() != mean.len() {
            return Err(ClusterError::DimensionMismatch {
                expected: mean.len(),
                got: data.ncols(),
            });
        }

        let mut result = data.clone();
        for mut row in result.axis_iter_mut(Axis(0)) {
            row -= mean;
            row /= std;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<Matrix> {
        self.fit(data)?;
        self.transform(data)
    }
}
