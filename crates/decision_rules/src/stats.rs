//! Statistical tests backing the `p_value` metrics.

use crate::conf::FISHER_RELATIVE_TOLERANCE;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};
use statrs::function::factorial::ln_binomial;

/// Two-sided Fisher exact test of the 2x2 table `[[a, b], [c, d]]`.
///
/// Sums the hypergeometric probabilities of every table with the observed
/// margins that is at most as likely as the observed one. An empty table
/// yields `1.0`.
pub fn fisher_exact_two_sided(a: usize, b: usize, c: usize, d: usize) -> f64 {
    let total = (a + b + c + d) as u64;
    if total == 0 {
        return 1.0;
    }
    let row = (a + b) as u64;
    let col = (a + c) as u64;

    let ln_denominator = ln_binomial(total, row);
    let pmf = |k: u64| -> f64 {
        (ln_binomial(col, k) + ln_binomial(total - col, row - k) - ln_denominator).exp()
    };

    let observed = pmf(a as u64);
    let threshold = observed * (1.0 + FISHER_RELATIVE_TOLERANCE);
    let k_min = (row + col).saturating_sub(total);
    let k_max = row.min(col);

    let p_value: f64 = (k_min..=k_max)
        .map(pmf)
        .filter(|probability| *probability <= threshold)
        .sum();
    p_value.min(1.0)
}

fn mean_and_variance(sample: &[f64]) -> (f64, f64) {
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let variance = sample.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance)
}

/// Two-sided Welch t-test for unequal variances.
///
/// NaN when either sample has fewer than two values or both samples are constant.
pub fn welch_t_test(first: &[f64], second: &[f64]) -> f64 {
    if first.len() < 2 || second.len() < 2 {
        return f64::NAN;
    }
    let (mean_1, var_1) = mean_and_variance(first);
    let (mean_2, var_2) = mean_and_variance(second);
    let se_1 = var_1 / first.len() as f64;
    let se_2 = var_2 / second.len() as f64;
    let se = se_1 + se_2;
    if se == 0.0 {
        return f64::NAN;
    }

    let t = (mean_1 - mean_2) / se.sqrt();
    let df = se.powi(2)
        / (se_1.powi(2) / (first.len() as f64 - 1.0) + se_2.powi(2) / (second.len() as f64 - 1.0));
    StudentsT::new(0.0, 1.0, df)
        .map_or(f64::NAN, |dist| 2.0 * (1.0 - dist.cdf(t.abs())))
}

/// CDF of the chi-squared distribution with one degree of freedom.
pub fn chi2_one_dof_cdf(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    ChiSquared::new(1.0).map_or(f64::NAN, |dist| dist.cdf(statistic.max(0.0)))
}

/// Quantile of the standard normal distribution.
pub fn standard_normal_quantile(probability: f64) -> f64 {
    Normal::new(0.0, 1.0).map_or(f64::NAN, |dist| dist.inverse_cdf(probability))
}
