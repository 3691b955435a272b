//! Regression rules: premises concluding a numeric estimate.

mod metrics;
mod rule;
mod ruleset;

pub use metrics::{RegressionRulesMetrics, REGRESSION_METRICS};
pub use rule::{RegressionConclusion, RegressionRule};
pub use ruleset::RegressionRuleSet;
