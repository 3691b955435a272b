//! Per-rule metric tables.
//!
//! Each task exposes a static registry of `(name, fn)` pairs. A
//! [`MetricsContext`] computes the covered, positive and negative masks of all
//! rules once, so uniqueness metrics do not re-evaluate premises per rule.

use crate::coverage::Coverage;
use crate::dataset::{count_true, Dataset};
use crate::error::{DecisionRulesError, Result};
use crate::rule::{check_dataset, Rule, RuleId};
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Int(v) => *v as f64,
            MetricValue::Float(v) => *v,
        }
    }

    /// Unknown counts become NaN.
    pub fn from_count(count: Option<usize>) -> Self {
        count.map_or(MetricValue::Float(f64::NAN), MetricValue::from)
    }
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        MetricValue::Int(v as i64)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

/// Metric values of one rule, keyed by metric name.
pub type RuleMetrics = BTreeMap<&'static str, MetricValue>;

/// Metric values of every rule, keyed by rule id.
pub type MetricsTable = HashMap<RuleId, RuleMetrics>;

pub type MetricFn<R> = fn(&MetricsContext<'_, R>, usize) -> Result<MetricValue>;

/// Which mask of the evaluated rule uniqueness is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoveredType {
    Positive,
    Negative,
    All,
}

/// Data and precomputed masks shared by the metric functions.
pub struct MetricsContext<'a, R: Rule> {
    pub rules: &'a [R],
    pub x: &'a Dataset,
    pub y: &'a [R::Label],
    covered: Vec<Vec<bool>>,
    positive: Vec<Vec<bool>>,
    negative: Vec<Vec<bool>>,
}

impl<'a, R: Rule> MetricsContext<'a, R> {
    pub fn new(rules: &'a [R], x: &'a Dataset, y: &'a [R::Label]) -> Result<Self> {
        let masks: Vec<(Vec<bool>, Vec<bool>, Vec<bool>)> = rules
            .par_iter()
            .map(|rule| {
                Ok((
                    rule.covered_mask(x)?,
                    rule.positive_covered_mask(x, y)?,
                    rule.negative_covered_mask(x, y)?,
                ))
            })
            .collect::<Result<_>>()?;

        let (covered, positive, negative): (Vec<_>, Vec<_>, Vec<_>) =
            masks.into_iter().multiunzip();
        Ok(Self {
            rules,
            x,
            y,
            covered,
            positive,
            negative,
        })
    }

    pub fn rule(&self, index: usize) -> &R {
        &self.rules[index]
    }

    pub fn coverage(&self, index: usize) -> Result<&Coverage> {
        self.rules[index].require_coverage()
    }

    pub fn covered_mask(&self, index: usize) -> &[bool] {
        &self.covered[index]
    }

    fn mask(&self, index: usize, covered_type: CoveredType) -> &[bool] {
        match covered_type {
            CoveredType::Positive => &self.positive[index],
            CoveredType::Negative => &self.negative[index],
            CoveredType::All => &self.covered[index],
        }
    }

    fn others_union(&self, index: usize, masks: &[Vec<bool>]) -> Vec<bool> {
        let mut union = vec![false; self.x.n_rows()];
        for (_, mask) in masks.iter().enumerate().filter(|(other, _)| *other != index) {
            union
                .iter_mut()
                .zip(mask)
                .for_each(|(acc, covered)| *acc |= *covered);
        }
        union
    }

    /// Positive (or negative) rows of the rule not in the positive (or
    /// negative) mask of any other rule.
    pub fn unique_in_label(&self, index: usize, covered_type: CoveredType) -> usize {
        let others = match covered_type {
            CoveredType::Positive => self.others_union(index, &self.positive),
            CoveredType::Negative => self.others_union(index, &self.negative),
            CoveredType::All => self.others_union(index, &self.covered),
        };
        Self::count_unique(self.mask(index, covered_type), &others)
    }

    /// Rows of the rule's `covered_type` mask not covered by any other rule's
    /// premise, whatever the other rules conclude.
    pub fn unique_in_premises(&self, index: usize, covered_type: CoveredType) -> usize {
        let others = self.others_union(index, &self.covered);
        Self::count_unique(self.mask(index, covered_type), &others)
    }

    fn count_unique(mask: &[bool], others: &[bool]) -> usize {
        mask.iter()
            .zip(others)
            .filter(|(covered, other)| **covered && !**other)
            .count()
    }

    pub fn covered_count(&self, index: usize) -> usize {
        count_true(&self.covered[index])
    }

    pub fn conditions_count(&self, index: usize) -> usize {
        self.rules[index].premise().conditions_count()
    }
}

/// Metric calculator of a rule set.
pub trait RulesMetrics {
    type Rule: Rule + 'static;

    fn rules(&self) -> &[Self::Rule];

    fn registry(&self) -> &'static [(&'static str, MetricFn<Self::Rule>)];

    fn supported_metrics(&self) -> Vec<&'static str> {
        self.registry().iter().map(|(name, _)| *name).collect()
    }

    /// Calculate `metrics_to_calculate` (all supported metrics when `None`) for
    /// every rule.
    fn calculate(
        &self,
        x: &Dataset,
        y: &[<Self::Rule as Rule>::Label],
        metrics_to_calculate: Option<&[&str]>,
    ) -> Result<MetricsTable> {
        let registry = self.registry();
        let selected: Vec<(&'static str, MetricFn<Self::Rule>)> = match metrics_to_calculate {
            None => registry.to_vec(),
            Some(names) => {
                let unsupported: Vec<&str> = names
                    .iter()
                    .copied()
                    .filter(|name| !registry.iter().any(|(known, _)| known == name))
                    .collect();
                if !unsupported.is_empty() {
                    return Err(DecisionRulesError::UnsupportedMetrics {
                        requested: unsupported.join(", "),
                        supported: self.supported_metrics().join(", "),
                    });
                }
                names
                    .iter()
                    .filter_map(|name| registry.iter().find(|(known, _)| known == name).copied())
                    .collect()
            }
        };

        let rules = self.rules();
        if let Some(first) = rules.first() {
            check_dataset(x, first.column_names(), y.len())?;
        } else {
            x.check_target_len(y.len())?;
        }
        debug!(
            rules = rules.len(),
            rows = x.n_rows(),
            metrics = selected.len(),
            "calculating rules metrics"
        );

        let context = MetricsContext::new(rules, x, y)?;
        rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let values = selected
                    .iter()
                    .map(|(name, metric)| Ok((*name, metric(&context, index)?)))
                    .collect::<Result<RuleMetrics>>()?;
                Ok((rule.uuid(), values))
            })
            .collect()
    }
}

// Metrics shared by every task.

pub fn p<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(MetricValue::from_count(ctx.coverage(index)?.p()))
}

pub fn n<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(MetricValue::from_count(ctx.coverage(index)?.n()))
}

#[allow(non_snake_case)]
pub fn P<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(MetricValue::from_count(ctx.coverage(index)?.P()))
}

#[allow(non_snake_case)]
pub fn N<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(MetricValue::from_count(ctx.coverage(index)?.N()))
}

pub fn unique_in_pos<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(ctx.unique_in_label(index, CoveredType::Positive).into())
}

pub fn unique_in_neg<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(ctx.unique_in_label(index, CoveredType::Negative).into())
}

pub fn p_unique<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(ctx.unique_in_premises(index, CoveredType::Positive).into())
}

pub fn n_unique<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(ctx.unique_in_premises(index, CoveredType::Negative).into())
}

pub fn all_unique<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(ctx.unique_in_premises(index, CoveredType::All).into())
}

/// `(p + n) / (P + N)`.
pub fn support<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(crate::measures::full_coverage(ctx.coverage(index)?).into())
}

pub fn conditions_count<R: Rule>(ctx: &MetricsContext<'_, R>, index: usize) -> Result<MetricValue> {
    Ok(ctx.conditions_count(index).into())
}

/// Wraps a coverage measure into a metric function.
pub fn coverage_measure<R: Rule>(
    ctx: &MetricsContext<'_, R>,
    index: usize,
    measure: crate::measures::MeasureFn,
) -> Result<MetricValue> {
    Ok(measure(ctx.coverage(index)?).into())
}
