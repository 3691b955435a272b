use estimator_api::api::{FitError, PredictError};
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecisionRulesError {
    #[error("Invalid coverage: {0}")]
    InvalidCoverage(String),

    #[error("Invalid relation operator \"{operator}\", operator must be one of: {supported}")]
    InvalidRelationOperator { operator: String, supported: String },

    #[error(
        "Unsupported metrics: \"{requested}\". Supported metrics for this type of ruleset are: {supported}"
    )]
    UnsupportedMetrics { requested: String, supported: String },

    #[error("Unknown measure \"{name}\", supported measures are: {supported}")]
    UnknownMeasure { name: String, supported: String },

    #[error("Invalid transform method \"{method}\", method must be one of: {supported}")]
    InvalidTransformMethod { method: String, supported: String },

    #[error("Attribute '{0}' not found in dataset columns")]
    AttributeNotFound(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid survival time attribute name: {0}")]
    InvalidSurvivalTimeAttribute(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, DecisionRulesError>;

impl From<DecisionRulesError> for FitError {
    fn from(err: DecisionRulesError) -> Self {
        FitError::InvalidInput(err.to_string())
    }
}

impl From<DecisionRulesError> for PredictError {
    fn from(err: DecisionRulesError) -> Self {
        match err {
            DecisionRulesError::InvalidState(_) => PredictError::NotFitted,
            DecisionRulesError::AttributeNotFound(_) | DecisionRulesError::ShapeMismatch(_) => {
                PredictError::InvalidInput(err.to_string())
            }
            other => PredictError::Unknown(other.to_string()),
        }
    }
}
