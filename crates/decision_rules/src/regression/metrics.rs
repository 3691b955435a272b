use super::rule::RegressionRule;
use crate::error::Result;
use crate::measures;
use crate::metrics::{self, coverage_measure, MetricFn, MetricValue, MetricsContext, RulesMetrics};
use crate::stats::welch_t_test;

type Ctx<'a> = MetricsContext<'a, RegressionRule>;

pub const REGRESSION_METRICS: &[(&str, MetricFn<RegressionRule>)] = &[
    ("p", metrics::p),
    ("n", metrics::n),
    ("P", metrics::P),
    ("N", metrics::N),
    ("unique_in_pos", metrics::unique_in_pos),
    ("unique_in_neg", metrics::unique_in_neg),
    ("p_unique", metrics::p_unique),
    ("n_unique", metrics::n_unique),
    ("all_unique", metrics::all_unique),
    ("support", metrics::support),
    ("conditions_count", metrics::conditions_count),
    ("y_covered_avg", y_covered_avg),
    ("y_covered_median", y_covered_median),
    ("y_covered_min", y_covered_min),
    ("y_covered_max", y_covered_max),
    ("mae", mae),
    ("rmse", rmse),
    ("p_value", p_value),
    ("precision", |ctx, i| coverage_measure(ctx, i, measures::precision)),
    ("coverage", |ctx, i| coverage_measure(ctx, i, measures::coverage)),
    ("C2", |ctx, i| coverage_measure(ctx, i, measures::c2)),
    ("RSS", |ctx, i| coverage_measure(ctx, i, measures::rss)),
    ("correlation", |ctx, i| coverage_measure(ctx, i, measures::correlation)),
    ("lift", |ctx, i| coverage_measure(ctx, i, measures::lift)),
];

/// Metrics of regression rules.
pub struct RegressionRulesMetrics<'a> {
    rules: &'a [RegressionRule],
}

impl<'a> RegressionRulesMetrics<'a> {
    pub fn new(rules: &'a [RegressionRule]) -> Self {
        Self { rules }
    }
}

impl RulesMetrics for RegressionRulesMetrics<'_> {
    type Rule = RegressionRule;

    fn rules(&self) -> &[RegressionRule] {
        self.rules
    }

    fn registry(&self) -> &'static [(&'static str, MetricFn<RegressionRule>)] {
        REGRESSION_METRICS
    }
}

/// Non-NaN targets split by the rule's covered mask.
fn split_targets(ctx: &Ctx<'_>, index: usize) -> (Vec<f64>, Vec<f64>) {
    ctx.covered_mask(index)
        .iter()
        .zip(ctx.y)
        .filter(|(_, target)| !target.is_nan())
        .fold((Vec::new(), Vec::new()), |(mut covered, mut uncovered), (c, target)| {
            if *c {
                covered.push(*target);
            } else {
                uncovered.push(*target);
            }
            (covered, uncovered)
        })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn y_covered_avg(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    Ok(mean(&split_targets(ctx, index).0).into())
}

fn y_covered_median(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let mut covered = split_targets(ctx, index).0;
    if covered.is_empty() {
        return Ok(f64::NAN.into());
    }
    covered.sort_by(f64::total_cmp);
    let middle = covered.len() / 2;
    let median = if covered.len() % 2 == 0 {
        (covered[middle - 1] + covered[middle]) / 2.0
    } else {
        covered[middle]
    };
    Ok(median.into())
}

fn y_covered_min(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let covered = split_targets(ctx, index).0;
    Ok(covered.into_iter().reduce(f64::min).unwrap_or(f64::NAN).into())
}

fn y_covered_max(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let covered = split_targets(ctx, index).0;
    Ok(covered.into_iter().reduce(f64::max).unwrap_or(f64::NAN).into())
}

/// Mean absolute error of the rule's value on the covered targets.
fn mae(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let value = ctx.rule(index).conclusion.value;
    let errors: Vec<f64> = split_targets(ctx, index).0.iter().map(|t| (t - value).abs()).collect();
    Ok(mean(&errors).into())
}

fn rmse(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let value = ctx.rule(index).conclusion.value;
    let errors: Vec<f64> = split_targets(ctx, index)
        .0
        .iter()
        .map(|t| (t - value).powi(2))
        .collect();
    Ok(mean(&errors).sqrt().into())
}

/// Welch t-test of covered against uncovered targets.
fn p_value(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let (covered, uncovered) = split_targets(ctx, index);
    Ok(welch_t_test(&covered, &uncovered).into())
}
