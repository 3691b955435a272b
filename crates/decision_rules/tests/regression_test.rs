//! Integration tests for decision_rules::regression
//!
//! Shared dataset: `x = [1, 2, 3, 4, 5, 6]`, `y = [1, 2, 3, 10, 11, 12]`.

use decision_rules::conditions::{Condition, ConditionKind, ElementaryCondition};
use decision_rules::coverage::Coverage;
use decision_rules::dataset::Dataset;
use decision_rules::error::DecisionRulesError;
use decision_rules::measures::{self, MeasureFn};
use decision_rules::regression::{RegressionConclusion, RegressionRule, RegressionRuleSet, REGRESSION_METRICS};
use decision_rules::rule::{Rule, RuleSet};
use estimator_api::api::Estimator;

const Y: [f64; 6] = [1.0, 2.0, 3.0, 10.0, 11.0, 12.0];

fn columns() -> Vec<String> {
    vec!["x".to_string()]
}

fn dataset() -> Dataset {
    Dataset::from_rows((1..=6).map(|v| vec![v as f64])).unwrap()
}

fn elementary(condition: ElementaryCondition) -> Condition {
    Condition::new(ConditionKind::Elementary(condition))
}

fn rule(premise: Condition) -> RegressionRule {
    RegressionRule::new(premise, RegressionConclusion::from_value(0.0, "y"), columns())
}

/// `x <= 3`, `x >= 4` and the empty premise.
fn ruleset() -> RegressionRuleSet {
    RegressionRuleSet::new(
        vec![
            rule(Condition::and(vec![elementary(ElementaryCondition::from_right(0, 3.0, true))])),
            rule(Condition::and(vec![elementary(ElementaryCondition::from_left(0, 4.0, true))])),
            rule(Condition::and(vec![])),
        ],
        columns(),
    )
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ---------------------------
// Conclusions
// ---------------------------

/// Mean and population standard deviation of the covered targets.
#[test]
fn conclusion_fit_covered() {
    let mut conclusion = RegressionConclusion::from_value(0.0, "y");
    conclusion.fit_covered(&[1.0, 2.0, 3.0, f64::NAN]);
    let std = (2.0f64 / 3.0).sqrt();
    assert_close(conclusion.value, 2.0);
    assert_close(conclusion.low, 2.0 - std);
    assert_close(conclusion.high, 2.0 + std);
    assert_eq!(conclusion.train_covered_y_mean, Some(2.0));
    assert!(conclusion.contains(2.5));
    assert!(!conclusion.contains(3.0));
}

/// Without covered targets the estimate is kept.
#[test]
fn conclusion_fit_without_targets() {
    let mut conclusion = RegressionConclusion::new(5.0, 4.0, 6.0, "y");
    conclusion.fit_covered(&[]);
    assert_eq!(conclusion.value, 5.0);
    assert_eq!((conclusion.low, conclusion.high), (4.0, 6.0));
    assert_eq!(conclusion.train_covered_y_mean, None);
    assert_eq!(conclusion.train_covered_y_std, None);
}

// ---------------------------
// Update and coverage
// ---------------------------

/// Positives are the rows whose target falls in the refitted interval.
#[test]
fn update_refits_conclusions() {
    let x = dataset();
    let mut ruleset = ruleset();
    ruleset.update(&x, &Y, measures::precision).unwrap();

    let low_rule = &ruleset.rules[0];
    assert_close(low_rule.conclusion.value, 2.0);
    assert_eq!(low_rule.coverage, Some(Coverage::new(1, 2, 1, 5).unwrap()));
    assert_close(low_rule.voting_weight.unwrap(), 1.0 / 3.0);

    let high_rule = &ruleset.rules[1];
    assert_close(high_rule.conclusion.value, 11.0);

    let everything = &ruleset.rules[2];
    assert_close(everything.conclusion.value, 6.5);
    assert_eq!(everything.coverage, Some(Coverage::new(4, 2, 4, 2).unwrap()));

    let default = ruleset.default_conclusion.as_ref().unwrap();
    assert_close(default.value, 6.5);
}

// ---------------------------
// Prediction
// ---------------------------

/// Voting-weighted mean of the covering rules.
#[test]
fn predict_weighted_mean() {
    let x = dataset();
    let mut ruleset = ruleset();
    ruleset.update(&x, &Y, measures::precision).unwrap();
    let predictions = ruleset.predict(&x).unwrap();
    // (2 * 1/3 + 6.5 * 2/3) / 1 and (11 * 1/3 + 6.5 * 2/3) / 1
    for (prediction, expected) in predictions.iter().zip([5.0, 5.0, 5.0, 8.0, 8.0, 8.0]) {
        assert_close(*prediction, expected);
    }
}

/// Zero weights fall back to the plain mean of the covering rules.
#[test]
fn predict_zero_weights_plain_mean() {
    let x = dataset();
    let mut ruleset = ruleset();
    let zero: MeasureFn = |_| 0.0;
    ruleset.update(&x, &Y, zero).unwrap();
    let predictions = ruleset.predict(&x).unwrap();
    assert_close(predictions[0], (2.0 + 6.5) / 2.0);
    assert_close(predictions[5], (11.0 + 6.5) / 2.0);
}

/// Uncovered rows get the training mean.
#[test]
fn predict_uncovered_rows_get_default() {
    let x = dataset();
    let mut ruleset = ruleset();
    ruleset.rules.truncate(1);
    ruleset.update(&x, &Y, measures::c2).unwrap();
    let predictions = ruleset.predict(&x).unwrap();
    assert_close(predictions[0], 2.0);
    assert_close(predictions[4], 6.5);
}

#[test]
fn predict_before_update_fails() {
    assert!(matches!(
        ruleset().predict(&dataset()),
        Err(DecisionRulesError::InvalidState(_))
    ));
}

#[test]
fn estimator_fit_predict() {
    let x = dataset();
    let mut ruleset = ruleset().with_voting_measure("precision").unwrap();
    Estimator::fit(&mut ruleset, &x, &Y[..]).unwrap();
    let predictions = Estimator::predict(&ruleset, &x).unwrap();
    assert_close(predictions[0], 5.0);
}

// ---------------------------
// Metrics
// ---------------------------

/// Statistics of the covered targets.
#[test]
fn rules_metrics_covered_targets() {
    let x = dataset();
    let mut ruleset = ruleset();
    ruleset.update(&x, &Y, measures::c2).unwrap();
    let table = ruleset.calculate_rules_metrics(&x, &Y, None).unwrap();

    let low = &table[&ruleset.rules[0].uuid()];
    assert_eq!(low.len(), REGRESSION_METRICS.len());
    assert_close(low["y_covered_avg"].as_f64(), 2.0);
    assert_close(low["y_covered_median"].as_f64(), 2.0);
    assert_close(low["y_covered_min"].as_f64(), 1.0);
    assert_close(low["y_covered_max"].as_f64(), 3.0);
    assert_close(low["mae"].as_f64(), 2.0 / 3.0);
    assert_close(low["rmse"].as_f64(), (2.0f64 / 3.0).sqrt());
    assert_close(low["all_unique"].as_f64(), 0.0);
    assert!(low["p_value"].as_f64() < 0.01);

    let everything = &table[&ruleset.rules[2].uuid()];
    assert_close(everything["y_covered_median"].as_f64(), 6.5);
    // nothing left uncovered to compare against
    assert!(everything["p_value"].as_f64().is_nan());
}

#[test]
fn unsupported_regression_metric() {
    let x = dataset();
    let mut ruleset = ruleset();
    ruleset.update(&x, &Y, measures::c2).unwrap();
    let err = ruleset
        .calculate_rules_metrics(&x, &Y, Some(&["lr+"]))
        .unwrap_err();
    assert!(matches!(err, DecisionRulesError::UnsupportedMetrics { requested, .. } if requested == "lr+"));
}

// ---------------------------
// Importances and stats
// ---------------------------

#[test]
fn condition_importances_sorted() {
    let x = dataset();
    let mut ruleset = ruleset();
    ruleset.update(&x, &Y, measures::c2).unwrap();
    let importances = ruleset
        .calculate_condition_importances(&x, &Y, measures::c2)
        .unwrap();
    assert_eq!(importances.len(), 2);
    assert!(importances[0].importance >= importances[1].importance);
    assert!(importances.iter().all(|i| i.attributes == vec!["x".to_string()]));
}

/// The single attribute collects the importance of both conditions.
#[test]
fn attribute_importances_sum_conditions() {
    let x = dataset();
    let mut ruleset = ruleset();
    ruleset.update(&x, &Y, measures::c2).unwrap();
    let condition_importances = ruleset
        .calculate_condition_importances(&x, &Y, measures::c2)
        .unwrap();
    let attribute_importances = ruleset.calculate_attribute_importances(&condition_importances);
    assert_eq!(attribute_importances.len(), 1);
    assert_eq!(attribute_importances[0].attribute, "x");
    assert_close(
        attribute_importances[0].importance,
        condition_importances.iter().map(|i| i.importance).sum(),
    );
}

#[test]
fn ruleset_stats_after_update() {
    let x = dataset();
    let mut ruleset = ruleset();
    ruleset.update(&x, &Y, measures::precision).unwrap();
    let stats = ruleset.calculate_ruleset_stats().unwrap();
    assert_eq!(stats.rules_count, 3);
    assert_eq!(stats.total_conditions_count, 2);
}

#[test]
fn rule_to_string() {
    let x = dataset();
    let mut ruleset = ruleset();
    ruleset.update(&x, &Y, measures::c2).unwrap();
    assert_eq!(
        ruleset.rules[0].to_string().unwrap(),
        "IF x <= 3.00 THEN y = {2.00} [1.18, 2.82]"
    );
}
