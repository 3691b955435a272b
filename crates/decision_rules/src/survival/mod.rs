//! Survival rules: premises concluding a Kaplan-Meier survival curve.
//!
//! Survival times are read from the column of `x` named by the rule set's
//! `survival_time_attr`; the target holds the status, `1` for an observed
//! event and anything else for a censored row.

mod kaplan_meier;
mod metrics;
mod rule;
mod ruleset;

pub use kaplan_meier::{log_rank, KaplanMeierEstimator};
pub use metrics::{SurvivalRulesMetrics, SURVIVAL_METRICS};
pub use rule::{is_event, SurvivalConclusion, SurvivalRule};
pub use ruleset::SurvivalRuleSet;
