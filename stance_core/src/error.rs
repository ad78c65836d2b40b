// stance_core/src/error.rs

use thiserror::Error;

/// Top-level error type for stance_core.
#[derive(Debug, Error)]
pub enum StanceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Estimator error: {0}")]
    Estimator(#[from] EstimatorError),
}

/// Errors returned while building or updating a `StateEstimator`.
/// The variants `update` can return do not allocate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    #[error("{field} dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{field} contains NaN or Inf")]
    NonFinite { field: &'static str },

    #[error("Body not found in model: {0}")]
    UnknownBody(String),

    #[error("Body of interest registered twice: {0}")]
    DuplicateBody(String),

    #[error("Joint not found in model: {0}")]
    UnknownJoint(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stance_error_from_config_error() {
        let err = ConfigError::InvalidValue {
            field: "contact.min_total_vertical_force".into(),
            message: "must be positive".into(),
        };
        let stance_err: StanceError = err.into();
        assert!(matches!(stance_err, StanceError::Config(_)));
        assert!(stance_err.to_string().contains("min_total_vertical_force"));
    }

    #[test]
    fn stance_error_from_estimator_error() {
        let err = EstimatorError::UnknownBody("l_foot".into());
        let stance_err: StanceError = err.into();
        assert!(matches!(stance_err, StanceError::Estimator(_)));
        assert!(stance_err.to_string().contains("l_foot"));
    }

    #[test]
    fn estimator_error_display_messages() {
        assert_eq!(
            EstimatorError::DimensionMismatch {
                field: "v",
                expected: 12,
                got: 11
            }
            .to_string(),
            "v dimension mismatch: expected 12, got 11"
        );
        assert_eq!(
            EstimatorError::NonFinite { field: "q" }.to_string(),
            "q contains NaN or Inf"
        );
        assert_eq!(
            EstimatorError::UnknownBody("pelvis".into()).to_string(),
            "Body not found in model: pelvis"
        );
        assert_eq!(
            EstimatorError::DuplicateBody("torso".into()).to_string(),
            "Body of interest registered twice: torso"
        );
        assert_eq!(
            EstimatorError::UnknownJoint("knee".into()).to_string(),
            "Joint not found in model: knee"
        );
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidValue {
                field: "contact.min_foot_vertical_force".into(),
                message: "must be positive".into()
            }
            .to_string(),
            "Invalid value for contact.min_foot_vertical_force: must be positive"
        );
    }
}
