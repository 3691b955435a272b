//! Integration tests for condition importances
//!
//! Reference dataset:
//!
//! | a | b | y |
//! |---|---|---|
//! | 1 | x | 1 |
//! | 6 | x | 1 |
//! | 7 | x | 1 |
//! | 8 | x | 0 |
//! | 2 | y | 0 |
//! | 9 | x | 1 |

use decision_rules::classification::{ClassificationConclusion, ClassificationRule, ClassificationRuleSet};
use decision_rules::conditions::{Condition, ConditionKind, ElementaryCondition};
use decision_rules::dataset::{Dataset, Value};
use decision_rules::importances::{calculate_attribute_importances, ConditionImportance};
use decision_rules::measures;
use decision_rules::rule::Rule;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn columns() -> Vec<String> {
    vec!["a".to_string(), "b".to_string()]
}

fn dataset() -> (Dataset, Vec<Value>) {
    let rows = [(1.0, "x"), (6.0, "x"), (7.0, "x"), (8.0, "x"), (2.0, "y"), (9.0, "x")];
    let x = Dataset::from_rows(
        rows.iter()
            .map(|(a, b)| vec![Value::from(*a), Value::from(*b)]),
    )
    .unwrap();
    let y = ["1", "1", "1", "0", "0", "1"].map(Value::from).to_vec();
    (x, y)
}

fn a_at_least_5() -> Condition {
    Condition::new(ConditionKind::Elementary(ElementaryCondition::from_left(0, 5.0, true)))
}

fn b_is_x() -> Condition {
    Condition::nominal(1, "x")
}

fn rule(premise: Condition) -> ClassificationRule {
    ClassificationRule::new(premise, ClassificationConclusion::new("1", "y"), columns())
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ---------------------------
// Reference values
// ---------------------------

/// Contributions are summed over every rule containing the condition.
#[test]
fn importances_summed_over_rules() {
    let (x, y) = dataset();
    let ruleset = ClassificationRuleSet::new(
        vec![
            rule(Condition::and(vec![a_at_least_5(), b_is_x()])),
            rule(a_at_least_5()),
        ],
        columns(),
    );

    let importances = ruleset
        .calculate_condition_importances(&x, &y, measures::precision)
        .unwrap();
    assert_eq!(importances.len(), 1);
    let class_1 = &importances["1"];
    assert_eq!(class_1.len(), 2);

    assert_eq!(class_1[0].condition, "a >= 5.00");
    assert_eq!(class_1[0].attributes, vec!["a".to_string()]);
    // 0.5 * (0.75 - 0.8 + 0.75) + (0.75 - 4 / 6)
    assert_close(class_1[0].importance, 0.35 + 0.75 - 4.0 / 6.0);

    assert_eq!(class_1[1].condition, "b = {x}");
    assert_eq!(class_1[1].attributes, vec!["b".to_string()]);
    // 0.5 * (0.75 - 0.75 + 0.8)
    assert_close(class_1[1].importance, 0.4);
}

/// Results are sorted by decreasing importance, not by appearance.
#[test]
fn importances_sorted_descending() {
    let (x, y) = dataset();
    let ruleset = ClassificationRuleSet::new(
        vec![rule(Condition::and(vec![a_at_least_5(), b_is_x()]))],
        columns(),
    );
    let importances = ruleset
        .calculate_condition_importances(&x, &y, measures::precision)
        .unwrap();
    let conditions: Vec<&str> = importances["1"].iter().map(|i| i.condition.as_str()).collect();
    assert_eq!(conditions, vec!["b = {x}", "a >= 5.00"]);
    assert_close(importances["1"][0].importance, 0.4);
    assert_close(importances["1"][1].importance, 0.35);
}

/// Rules are grouped by class before computing importances.
#[test]
fn importances_grouped_by_class() {
    let (x, y) = dataset();
    let negative = ClassificationRule::new(
        Condition::and(vec![Condition::nominal(1, "y")]),
        ClassificationConclusion::new("0", "y"),
        columns(),
    );
    let ruleset = ClassificationRuleSet::new(
        vec![rule(Condition::and(vec![a_at_least_5(), b_is_x()])), negative],
        columns(),
    );
    let importances = ruleset
        .calculate_condition_importances(&x, &y, measures::precision)
        .unwrap();
    assert_eq!(importances.keys().collect::<Vec<_>>(), vec!["0", "1"]);
    assert_eq!(importances["0"].len(), 1);
    assert_eq!(importances["0"][0].condition, "b = {y}");
    // removing the only condition leaves the empty premise: 1.0 - 2 / 6
    assert_close(importances["0"][0].importance, 1.0 - 2.0 / 6.0);
}

/// A rule covering no row has a NaN precision, its conditions sort last.
#[test]
fn nan_importances_sorted_last() {
    let (x, y) = dataset();
    let a_at_least_100 =
        Condition::new(ConditionKind::Elementary(ElementaryCondition::from_left(0, 100.0, true)));
    let ruleset = ClassificationRuleSet::new(
        vec![
            rule(Condition::and(vec![a_at_least_100, b_is_x()])),
            rule(Condition::and(vec![Condition::nominal(1, "y")])),
        ],
        columns(),
    );
    let importances = ruleset
        .calculate_condition_importances(&x, &y, measures::precision)
        .unwrap();
    let class_1 = &importances["1"];
    assert_eq!(class_1.len(), 3);

    assert_eq!(class_1[0].condition, "b = {y}");
    // precision 0 against 4 / 6 for the empty premise
    assert_close(class_1[0].importance, -4.0 / 6.0);
    assert!(class_1[1..].iter().all(|i| i.importance.is_nan()));
}

// ---------------------------
// Attribute importances
// ---------------------------

/// Attribute importances of a class sum the importances of its conditions.
#[test]
fn attribute_importances_per_class() {
    let (x, y) = dataset();
    let ruleset = ClassificationRuleSet::new(
        vec![
            rule(Condition::and(vec![a_at_least_5(), b_is_x()])),
            rule(a_at_least_5()),
        ],
        columns(),
    );
    let condition_importances = ruleset
        .calculate_condition_importances(&x, &y, measures::precision)
        .unwrap();
    let attribute_importances = ruleset.calculate_attribute_importances(&condition_importances);

    assert_eq!(attribute_importances.keys().collect::<Vec<_>>(), vec!["1"]);
    let class_1 = &attribute_importances["1"];
    assert_eq!(class_1.len(), 2);
    assert_eq!(class_1[0].attribute, "a");
    assert_close(class_1[0].importance, 0.35 + 0.75 - 4.0 / 6.0);
    assert_eq!(class_1[1].attribute, "b");
    assert_close(class_1[1].importance, 0.4);
}

/// Conditions over several attributes count fully for each of them.
#[test]
fn attribute_importances_aggregation() {
    let record = |condition: &str, attributes: &[&str], importance: f64| ConditionImportance {
        condition: condition.to_string(),
        attributes: attributes.iter().map(|a| a.to_string()).collect(),
        importance,
    };
    let importances = calculate_attribute_importances(&[
        record("a > b", &["a", "b"], 0.5),
        record("c = {x}", &["c"], f64::NAN),
        record("a >= 1.00", &["a"], 0.25),
        record("b = {y}", &["b"], 0.1),
        record("d < 2.00", &["d"], -0.2),
    ]);

    let attributes: Vec<&str> = importances.iter().map(|i| i.attribute.as_str()).collect();
    assert_eq!(attributes, vec!["a", "b", "d", "c"]);
    assert_close(importances[0].importance, 0.75);
    assert_close(importances[1].importance, 0.6);
    assert_close(importances[2].importance, -0.2);
    assert!(importances[3].importance.is_nan());

    assert!(calculate_attribute_importances(&[]).is_empty());
}

// ---------------------------
// Side effects
// ---------------------------

/// Computing importances leaves rules, coverages and weights untouched.
#[test]
fn importances_do_not_mutate_rules() {
    let mut rng = StdRng::seed_from_u64(42);
    let rows: Vec<Vec<Value>> = (0..200)
        .map(|_| {
            let a: f64 = rng.random_range(0.0..10.0);
            let b = if rng.random_range(0..2) == 0 { "x" } else { "y" };
            vec![Value::from(a), Value::from(b)]
        })
        .collect();
    let y: Vec<Value> = rows
        .iter()
        .map(|row| {
            let label = if row[0].as_f64().unwrap_or(0.0) > 5.0 { "1" } else { "0" };
            Value::from(label)
        })
        .collect();
    let x = Dataset::from_rows(rows).unwrap();

    let mut ruleset = ClassificationRuleSet::new(
        vec![
            rule(Condition::and(vec![a_at_least_5(), b_is_x()])),
            rule(Condition::or(vec![a_at_least_5(), Condition::nominal(1, "y")])),
        ],
        columns(),
    );
    ruleset.update(&x, &y, measures::c2).unwrap();
    let before = ruleset.rules.clone();

    let importances = ruleset
        .calculate_condition_importances(&x, &y, measures::c2)
        .unwrap();
    assert_eq!(importances["1"].len(), 3);

    for (after, before) in ruleset.rules.iter().zip(&before) {
        assert_eq!(after.uuid(), before.uuid());
        assert_eq!(after, before);
        assert_eq!(after.voting_weight, before.voting_weight);
    }
}
