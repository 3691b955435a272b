use thiserror::Error;

#[derive(Debug, Error)]
pub enum FitError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Numerical error: {0}")]
    Numerical(String),
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Model is not fitted")]
    NotFitted,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Numerical error: {0}")]
    Numerical(String),
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Fit/predict contract.
///
/// For rule sets `fit` is the explicit update pass that computes coverages,
/// voting weights and conclusion statistics over a training dataset. Rule sets
/// built by a factory or restored from storage must be fitted before
/// `predict` is called.
pub trait Estimator {
    type Input: ?Sized;
    type Target: ?Sized;
    type Output;

    fn fit(&mut self, x: &Self::Input, y: &Self::Target) -> Result<(), FitError> {
        self._fit_impl(x, y)
    }

    fn _fit_impl(&mut self, _x: &Self::Input, _y: &Self::Target) -> Result<(), FitError> {
        // Default implementation can be overridden by specific estimators
        Err(FitError::InvalidInput(
            "Default fit implementation not provided".to_string(),
        ))
    }

    fn predict(&self, x: &Self::Input) -> Result<Self::Output, PredictError> {
        self._predict_impl(x)
    }

    fn _predict_impl(&self, _x: &Self::Input) -> Result<Self::Output, PredictError> {
        // Default implementation can be overridden by specific estimators
        Err(PredictError::NotFitted)
    }
}
