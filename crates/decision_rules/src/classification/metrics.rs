use super::rule::ClassificationRule;
use crate::error::Result;
use crate::measures;
use crate::metrics::{self, coverage_measure, MetricFn, MetricValue, MetricsContext, RulesMetrics};
use crate::stats::fisher_exact_two_sided;

type Ctx<'a> = MetricsContext<'a, ClassificationRule>;

pub const CLASSIFICATION_METRICS: &[(&str, MetricFn<ClassificationRule>)] = &[
    ("p", metrics::p),
    ("n", metrics::n),
    ("P", metrics::P),
    ("N", metrics::N),
    ("covered_count", covered_count),
    ("unique_in_pos", metrics::unique_in_pos),
    ("unique_in_neg", metrics::unique_in_neg),
    ("p_unique", metrics::p_unique),
    ("n_unique", metrics::n_unique),
    ("all_unique", metrics::all_unique),
    ("support", metrics::support),
    ("conditions_count", metrics::conditions_count),
    ("precision", |ctx, i| coverage_measure(ctx, i, measures::precision)),
    ("coverage", |ctx, i| coverage_measure(ctx, i, measures::coverage)),
    ("C2", |ctx, i| coverage_measure(ctx, i, measures::c2)),
    ("RSS", |ctx, i| coverage_measure(ctx, i, measures::rss)),
    ("correlation", |ctx, i| coverage_measure(ctx, i, measures::correlation)),
    ("lift", |ctx, i| coverage_measure(ctx, i, measures::lift)),
    ("p_value", p_value),
    ("sensitivity", |ctx, i| coverage_measure(ctx, i, measures::sensitivity)),
    ("specificity", |ctx, i| coverage_measure(ctx, i, measures::specificity)),
    ("negative_predictive_value", negative_predictive_value),
    ("odds_ratio", |ctx, i| coverage_measure(ctx, i, measures::odds_ratio)),
    ("relative_risk", |ctx, i| coverage_measure(ctx, i, measures::relative_risk)),
    ("lr+", lr_plus),
    ("lr-", lr_minus),
];

/// Metrics of classification rules.
pub struct ClassificationRulesMetrics<'a> {
    rules: &'a [ClassificationRule],
}

impl<'a> ClassificationRulesMetrics<'a> {
    pub fn new(rules: &'a [ClassificationRule]) -> Self {
        Self { rules }
    }
}

impl RulesMetrics for ClassificationRulesMetrics<'_> {
    type Rule = ClassificationRule;

    fn rules(&self) -> &[ClassificationRule] {
        self.rules
    }

    fn registry(&self) -> &'static [(&'static str, MetricFn<ClassificationRule>)] {
        CLASSIFICATION_METRICS
    }
}

fn covered_count(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let coverage = ctx.coverage(index)?;
    Ok(match (coverage.p(), coverage.n()) {
        (Some(p), Some(n)) => (p + n).into(),
        _ => MetricValue::Float(f64::NAN),
    })
}

/// Two-sided Fisher exact test on `[[p, n], [P - p, N - n]]`.
fn p_value(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let value = match ctx.coverage(index)?.as_tuple() {
        (Some(p), Some(n), Some(pp), Some(nn)) => fisher_exact_two_sided(p, n, pp - p, nn - n),
        _ => f64::NAN,
    };
    Ok(value.into())
}

/// `(N - n) / (P - p + N - n)`, NaN when the rule covers every row.
#[allow(non_snake_case)]
fn negative_predictive_value(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let (p, n, P, N) = ctx.coverage(index)?.as_f64();
    let true_negatives = N - n;
    let false_negatives = P - p;
    let value = if true_negatives + false_negatives == 0.0 {
        f64::NAN
    } else {
        true_negatives / (true_negatives + false_negatives)
    };
    Ok(value.into())
}

/// `sensitivity / (1 - specificity)`, `+inf` on a zero denominator.
fn lr_plus(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let coverage = ctx.coverage(index)?;
    let denominator = 1.0 - measures::specificity(coverage);
    let value = if denominator == 0.0 {
        f64::INFINITY
    } else {
        measures::sensitivity(coverage) / denominator
    };
    Ok(value.into())
}

/// `(1 - sensitivity) / specificity`, `+inf` on a zero denominator.
fn lr_minus(ctx: &Ctx<'_>, index: usize) -> Result<MetricValue> {
    let coverage = ctx.coverage(index)?;
    let denominator = measures::specificity(coverage);
    let value = if denominator == 0.0 {
        f64::INFINITY
    } else {
        (1.0 - measures::sensitivity(coverage)) / denominator
    };
    Ok(value.into())
}
