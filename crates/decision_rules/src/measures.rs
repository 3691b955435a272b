//! Rule quality measures.
//!
//! Every measure is a pure function of a [`Coverage`]. Zero denominators are
//! not errors: a measure whose value is undefined returns NaN, and the few
//! unbounded ratios (odds ratio, relative risk, logical sufficiency) return
//! `+inf` when only the denominator vanishes. Unknown coverage counts
//! propagate as NaN.

use crate::conf::{F_MEASURE_BETA, G_MEASURE_G, KLOSGEN_OMEGA, M_ESTIMATE_M};
use crate::coverage::Coverage;
use crate::error::{DecisionRulesError, Result};
use itertools::Itertools;

pub type MeasureFn = fn(&Coverage) -> f64;

/// `num / den`, NaN when `den == 0`.
fn div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        f64::NAN
    } else {
        num / den
    }
}

/// `num / den`, signed infinity when only `den == 0`, NaN for `0 / 0`.
fn div_unbounded(num: f64, den: f64) -> f64 {
    if den != 0.0 {
        num / den
    } else if num > 0.0 {
        f64::INFINITY
    } else if num < 0.0 {
        f64::NEG_INFINITY
    } else {
        f64::NAN
    }
}

/// `p - n`.
pub fn accuracy(c: &Coverage) -> f64 {
    let (p, n, _, _) = c.as_f64();
    p - n
}

/// `p / (p + n)`, NaN when the rule covers nothing.
pub fn precision(c: &Coverage) -> f64 {
    let (p, n, _, _) = c.as_f64();
    div(p, p + n)
}

/// `p / P`, NaN when there are no positives.
#[allow(non_snake_case)]
pub fn coverage(c: &Coverage) -> f64 {
    let (p, _, P, _) = c.as_f64();
    div(p, P)
}

/// Same as [`coverage`].
pub fn sensitivity(c: &Coverage) -> f64 {
    coverage(c)
}

/// `(N - n) / N`, NaN when there are no negatives.
#[allow(non_snake_case)]
pub fn specificity(c: &Coverage) -> f64 {
    let (_, n, _, N) = c.as_f64();
    div(N - n, N)
}

/// `p / P - n / N`.
#[allow(non_snake_case)]
pub fn rss(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div(p, P) - div(n, N)
}

/// `((P + N) * precision - P) / N * (1 + p / P) / 2`.
#[allow(non_snake_case)]
pub fn c2(c: &Coverage) -> f64 {
    let (p, _, P, N) = c.as_f64();
    div((P + N) * precision(c) - P, N) * (1.0 + div(p, P)) / 2.0
}

/// Matthews correlation of the rule with the positive class.
#[allow(non_snake_case)]
pub fn correlation(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div(p * N - P * n, (P * N * (p + n) * (P - p + N - n)).sqrt())
}

/// `p * (P + N) / ((p + n) * P)`.
#[allow(non_snake_case)]
pub fn lift(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div(p * (P + N), (p + n) * P)
}

/// `p * (N - n) / (n * (P - p))`, `+inf` when `n * (P - p) == 0` and the numerator is positive.
#[allow(non_snake_case)]
pub fn odds_ratio(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div_unbounded(p * (N - n), n * (P - p))
}

/// `(p / (p + n)) / ((P - p) / (P - p + N - n))`, `+inf` when no positive is left uncovered.
#[allow(non_snake_case)]
pub fn relative_risk(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div_unbounded(p * (P - p + N - n), (p + n) * (P - p))
}

/// `(p + 1) / (p + n + 2)`, always defined.
pub fn laplace(c: &Coverage) -> f64 {
    let (p, n, _, _) = c.as_f64();
    (p + 1.0) / (p + n + 2.0)
}

/// `(p + m * P / (P + N)) / (p + n + m)` with `m = 2`.
#[allow(non_snake_case)]
pub fn m_estimate(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div(p + M_ESTIMATE_M * div(P, P + N), p + n + M_ESTIMATE_M)
}

/// F-beta of precision and recall with `beta = 2`.
pub fn f_measure(c: &Coverage) -> f64 {
    let prec = precision(c);
    let rec = sensitivity(c);
    let beta2 = F_MEASURE_BETA * F_MEASURE_BETA;
    div((1.0 + beta2) * prec * rec, beta2 * prec + rec)
}

/// `p / (p + n + g)` with `g = 2`.
pub fn g_measure(c: &Coverage) -> f64 {
    let (p, n, _, _) = c.as_f64();
    div(p, p + n + G_MEASURE_G)
}

/// Cohen's kappa of the rule seen as a binary classifier.
#[allow(non_snake_case)]
pub fn kappa(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    let total = P + N;
    let observed = div(p + N - n, total);
    let expected = div((p + n) * P + (total - p - n) * N, total * total);
    div(observed - expected, 1.0 - expected)
}

/// `((p + n) / (P + N))^0.43 * (precision - P / (P + N))`.
#[allow(non_snake_case)]
pub fn klosgen(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div(p + n, P + N).powf(KLOSGEN_OMEGA) * (precision(c) - div(P, P + N))
}

/// `(p + n) / (P + N) * (precision - P / (P + N))`.
#[allow(non_snake_case)]
pub fn weighted_relative_accuracy(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div(p + n, P + N) * (precision(c) - div(P, P + N))
}

/// `(p + n) / (P + N)`.
#[allow(non_snake_case)]
pub fn full_coverage(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div(p + n, P + N)
}

/// `precision - (P - p) / (P - p + N - n)`.
#[allow(non_snake_case)]
pub fn s_bayesian(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    precision(c) - div(P - p, P - p + N - n)
}

/// `p * N / (n * P)`, `+inf` for a rule covering no negatives.
#[allow(non_snake_case)]
pub fn logical_sufficiency(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div_unbounded(p * N, n * P)
}

/// `(p * N - n * P) / (P + N)`.
#[allow(non_snake_case)]
pub fn rule_interest(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    div(p * N - n * P, P + N)
}

/// `sqrt(p / P * (1 - n / N))`.
#[allow(non_snake_case)]
pub fn geo_rss(c: &Coverage) -> f64 {
    let (p, n, P, N) = c.as_f64();
    (div(p, P) * (1.0 - div(n, N))).sqrt()
}

/// `p / (n + P)`.
#[allow(non_snake_case)]
pub fn mutual_support(c: &Coverage) -> f64 {
    let (p, n, P, _) = c.as_f64();
    div(p, n + P)
}

/// `precision * ln(lift)`, NaN when the rule covers no positives.
pub fn one_way_support(c: &Coverage) -> f64 {
    let (p, _, _, _) = c.as_f64();
    if p == 0.0 {
        return f64::NAN;
    }
    precision(c) * lift(c).ln()
}

/// `p / (P + N) * ln(lift)`, NaN when the rule covers no positives.
#[allow(non_snake_case)]
pub fn two_way_support(c: &Coverage) -> f64 {
    let (p, _, P, N) = c.as_f64();
    if p == 0.0 {
        return f64::NAN;
    }
    div(p, P + N) * lift(c).ln()
}

/// Voting measure of rule sets fitted through `Estimator::fit`.
pub const DEFAULT_VOTING_MEASURE: MeasureFn = c2;

/// Measures selectable by name.
pub const MEASURES: &[(&str, MeasureFn)] = &[
    ("accuracy", accuracy),
    ("precision", precision),
    ("coverage", coverage),
    ("sensitivity", sensitivity),
    ("specificity", specificity),
    ("rss", rss),
    ("c2", c2),
    ("correlation", correlation),
    ("lift", lift),
    ("odds_ratio", odds_ratio),
    ("relative_risk", relative_risk),
    ("laplace", laplace),
    ("m_estimate", m_estimate),
    ("f_measure", f_measure),
    ("g_measure", g_measure),
    ("kappa", kappa),
    ("klosgen", klosgen),
    ("weighted_relative_accuracy", weighted_relative_accuracy),
    ("full_coverage", full_coverage),
    ("s_bayesian", s_bayesian),
    ("logical_sufficiency", logical_sufficiency),
    ("rule_interest", rule_interest),
    ("geo_rss", geo_rss),
    ("mutual_support", mutual_support),
    ("one_way_support", one_way_support),
    ("two_way_support", two_way_support),
];

/// Look a measure up by name (case insensitive).
pub fn measure_by_name(name: &str) -> Result<MeasureFn> {
    MEASURES
        .iter()
        .find(|(measure_name, _)| measure_name.eq_ignore_ascii_case(name))
        .map(|(_, measure)| *measure)
        .ok_or_else(|| DecisionRulesError::UnknownMeasure {
            name: name.to_string(),
            supported: MEASURES.iter().map(|(n, _)| *n).join(", "),
        })
}
