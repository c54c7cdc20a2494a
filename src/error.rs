use thiserror::Error;

/// Errors returned by clustering, search and evaluation operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClusterError {
    #[error("invalid parameter `{name}` = {value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        constraint: String,
    },

    #[error("input matrix must have at least one sample and one feature")]
    EmptyInput,

    #[error("dimension mismatch: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("length mismatch: expected {expected} labels, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("{metric} is not computable: {reason}")]
    UndefinedMetric { metric: &'static str, reason: String },

    #[error("{model} not fitted, call fit() first")]
    NotFitted { model: &'static str },

    #[error("config error: {0}")]
    Config(String),
}

impl ClusterError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl ToString,
        constraint: impl Into<String>,
    ) -> Self {
        ClusterError::InvalidParameter {
            name,
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_names_the_bound() {
        let err = ClusterError::invalid("k", 7, "must be <= n_samples (4)");
        assert_eq!(
            err.to_string(),
            "invalid parameter `k` = 7: must be <= n_samples (4)"
        );
    }

    #[test]
    fn undefined_metric_message() {
        let err = ClusterError::UndefinedMetric {
            metric: "silhouette",
            reason: "1 non-noise cluster".to_string(),
        };
        assert_eq!(err.to_string(), "silhouette is not computable: 1 non-noise cluster");
    }
}
