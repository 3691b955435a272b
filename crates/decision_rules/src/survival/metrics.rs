use super::rule::SurvivalRule;
use crate::error::{DecisionRulesError, Result};
use crate::metrics::{self, MetricFn, MetricValue, MetricsContext, RulesMetrics};

type Ctx<'a> = MetricsContext<'a, SurvivalRule>;

pub const SURVIVAL_METRICS: &[(&str, MetricFn<SurvivalRule>)] = &[
    ("p", metrics::p),
    ("n", metrics::n),
    ("P", metrics::P),
    ("N", metrics::N),
    ("unique", metrics::all_unique),
    ("conditions_count", metrics::conditions_count),
    ("median_survival_time", |ctx, i| Ok(ctx.rule(i).conclusion.value.into())),
    ("median_survival_time_ci_lower", |ctx, i| {
        Ok(ctx.rule(i).conclusion.median_survival_time_ci_lower.into())
    }),
    ("median_survival_time_ci_upper", |ctx, i| {
        Ok(ctx.rule(i).conclusion.median_survival_time_ci_upper.into())
    }),
    ("events_count", events_count),
    ("censored_count", censored_count),
    ("log_rank", log_rank),
    ("p_value", |ctx, i| Ok(ctx.rule(i).p_value()?.into())),
];

/// Metrics of survival rules.
pub struct SurvivalRulesMetrics<'a> {
    rules: &'a [SurvivalRule],
}

impl<'a> SurvivalRulesMetrics<'a> {
    pub fn new(rules: &'a [SurvivalRule]) -> Self {
        Self { rules }
    }
}

impl RulesMetrics for SurvivalRulesMetrics<'_> {
    type Rule = SurvivalRule;

    fn rules(&self) -> &[SurvivalRule] {
        self.rules
    }

    fn registry(&self) -> &'static [(&'static str, MetricFn<SurvivalRule>)] {
        SURVIVAL_METRICS
    }
}

fn events_count(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let estimator = ctx.rule(index).conclusion.require_estimator()?;
    Ok(estimator.events_count_sum().into())
}

fn censored_count(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let estimator = ctx.rule(index).conclusion.require_estimator()?;
    Ok(estimator.censored_count_sum().into())
}

fn log_rank(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let rule = ctx.rule(index);
    rule.log_rank.map(MetricValue::from).ok_or_else(|| {
        DecisionRulesError::InvalidState(format!(
            "log_rank has not been computed for the rule with uuid: {}",
            rule.uuid
        ))
    })
}
