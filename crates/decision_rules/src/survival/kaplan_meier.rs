//! Kaplan-Meier survival curves and the log-rank test.

use crate::stats::{chi2_one_dof_cdf, standard_normal_quantile};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Step function of the survival probability, one entry per distinct time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KaplanMeierEstimator {
    pub times: Vec<f64>,
    pub events_count: Vec<usize>,
    pub censored_count: Vec<usize>,
    pub at_risk_count: Vec<usize>,
    pub probabilities: Vec<f64>,
}

impl KaplanMeierEstimator {
    /// Fit on survival times and event indicators (`true` = event, `false` =
    /// censored). Rows with a NaN time are skipped.
    pub fn fit(times: &[f64], events: &[bool]) -> Self {
        let observations: Vec<(f64, bool)> = times
            .iter()
            .copied()
            .zip(events.iter().copied())
            .filter(|(time, _)| !time.is_nan())
            .sorted_by(|a, b| a.0.total_cmp(&b.0))
            .collect();

        let mut estimator = Self::default();
        let mut at_risk = observations.len();
        let mut probability = 1.0;
        for (time, group) in &observations.iter().chunk_by(|(time, _)| *time) {
            let (events_count, censored_count) =
                group.fold((0, 0), |(e, c), (_, event)| if *event { (e + 1, c) } else { (e, c + 1) });
            probability *= 1.0 - events_count as f64 / at_risk as f64;

            estimator.times.push(time);
            estimator.events_count.push(events_count);
            estimator.censored_count.push(censored_count);
            estimator.at_risk_count.push(at_risk);
            estimator.probabilities.push(probability);
            at_risk -= events_count + censored_count;
        }
        estimator
    }

    pub fn events_count_sum(&self) -> usize {
        self.events_count.iter().sum()
    }

    pub fn censored_count_sum(&self) -> usize {
        self.censored_count.iter().sum()
    }

    /// Survival probability at `time`, 1 before the first observed time.
    pub fn probability_at(&self, time: f64) -> f64 {
        let position = self.times.partition_point(|t| *t <= time);
        if position == 0 {
            1.0
        } else {
            self.probabilities[position - 1]
        }
    }

    fn at_risk_at(&self, time: f64) -> usize {
        let position = self.times.partition_point(|t| *t < time);
        self.at_risk_count.get(position).copied().unwrap_or(0)
    }

    fn count_at(times: &[f64], counts: &[usize], time: f64) -> usize {
        times
            .iter()
            .position(|t| *t == time)
            .map_or(0, |position| counts[position])
    }

    /// First time the curve drops to 0.5 or below, `inf` if it never does.
    pub fn median_survival_time(&self) -> f64 {
        Self::median_of(&self.times, &self.probabilities)
    }

    fn median_of(times: &[f64], probabilities: &[f64]) -> f64 {
        times
            .iter()
            .zip(probabilities)
            .find(|(_, probability)| **probability <= 0.5)
            .map_or(f64::INFINITY, |(time, _)| *time)
    }

    /// Pointwise confidence band using Greenwood's variance on the
    /// log(-log) scale. Returns `(lower, upper)` curves.
    pub fn confidence_band(&self, level: f64) -> (Vec<f64>, Vec<f64>) {
        let z = standard_normal_quantile((1.0 + level) / 2.0);
        let mut greenwood = 0.0;
        let mut lower = Vec::with_capacity(self.times.len());
        let mut upper = Vec::with_capacity(self.times.len());

        for ((events, at_risk), probability) in self
            .events_count
            .iter()
            .zip(&self.at_risk_count)
            .zip(&self.probabilities)
        {
            let (events, at_risk) = (*events as f64, *at_risk as f64);
            if at_risk > events {
                greenwood += events / (at_risk * (at_risk - events));
            }
            if *probability <= 0.0 {
                lower.push(0.0);
                upper.push(0.0);
            } else if *probability >= 1.0 {
                lower.push(1.0);
                upper.push(1.0);
            } else {
                let log_probability = probability.ln();
                let spread = z * (greenwood / log_probability.powi(2)).sqrt();
                lower.push(probability.powf(spread.exp()));
                upper.push(probability.powf((-spread).exp()));
            }
        }
        (lower, upper)
    }

    /// Confidence interval of the median survival time, the medians of the
    /// lower and upper confidence curves.
    pub fn median_survival_time_ci(&self, level: f64) -> (f64, f64) {
        let (lower, upper) = self.confidence_band(level);
        (
            Self::median_of(&self.times, &lower),
            Self::median_of(&self.times, &upper),
        )
    }

    /// Pointwise average of several curves over the union of their times.
    /// Counts are summed over the curves.
    pub fn average(estimators: &[&KaplanMeierEstimator]) -> Self {
        if estimators.is_empty() {
            return Self::default();
        }
        let times: Vec<f64> = estimators
            .iter()
            .flat_map(|e| e.times.iter().copied())
            .sorted_by(f64::total_cmp)
            .dedup()
            .collect();

        let count = estimators.len() as f64;
        let mut average = Self::default();
        for time in times {
            average.times.push(time);
            average.probabilities.push(
                estimators.iter().map(|e| e.probability_at(time)).sum::<f64>() / count,
            );
            average.events_count.push(
                estimators
                    .iter()
                    .map(|e| Self::count_at(&e.times, &e.events_count, time))
                    .sum(),
            );
            average.censored_count.push(
                estimators
                    .iter()
                    .map(|e| Self::count_at(&e.times, &e.censored_count, time))
                    .sum(),
            );
            average
                .at_risk_count
                .push(estimators.iter().map(|e| e.at_risk_at(time)).sum());
        }
        average
    }
}

/// Log-rank test of the rows in `group` against the other rows.
///
/// Returns the chi-squared (1 dof) CDF of the test statistic, so the p-value
/// of the test is `1 - log_rank`. Zero when either side is empty or the
/// variance vanishes.
pub fn log_rank(times: &[f64], events: &[bool], group: &[bool]) -> f64 {
    let observations: Vec<(f64, bool, bool)> = times
        .iter()
        .zip(events)
        .zip(group)
        .filter(|((time, _), _)| !time.is_nan())
        .map(|((time, event), in_group)| (*time, *event, *in_group))
        .sorted_by(|a, b| a.0.total_cmp(&b.0))
        .collect();

    let mut at_risk = observations.len() as f64;
    let mut at_risk_group = observations.iter().filter(|o| o.2).count() as f64;
    let (mut observed, mut expected, mut variance) = (0.0, 0.0, 0.0);

    for (_, chunk) in &observations.iter().chunk_by(|o| o.0) {
        let (mut deaths, mut deaths_group, mut removed, mut removed_group) = (0.0, 0.0, 0.0, 0.0);
        for (_, event, in_group) in chunk {
            removed += 1.0;
            if *in_group {
                removed_group += 1.0;
            }
            if *event {
                deaths += 1.0;
                if *in_group {
                    deaths_group += 1.0;
                }
            }
        }
        if deaths > 0.0 {
            let share = at_risk_group / at_risk;
            observed += deaths_group;
            expected += deaths * share;
            if at_risk > 1.0 {
                variance += deaths * share * (1.0 - share) * (at_risk - deaths) / (at_risk - 1.0);
            }
        }
        at_risk -= removed;
        at_risk_group -= removed_group;
    }

    let statistic = if variance > 0.0 {
        (observed - expected).powi(2) / variance
    } else {
        0.0
    };
    chi2_one_dof_cdf(statistic)
}
