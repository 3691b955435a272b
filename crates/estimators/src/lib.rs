//! Shared fit/predict contract for rule based estimators.

pub mod api;
