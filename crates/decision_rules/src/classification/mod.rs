//! Classification rules: premises concluding a class label.

mod metrics;
mod rule;
mod ruleset;

pub use metrics::{ClassificationRulesMetrics, CLASSIFICATION_METRICS};
pub use rule::{ClassificationConclusion, ClassificationRule};
pub use ruleset::ClassificationRuleSet;
