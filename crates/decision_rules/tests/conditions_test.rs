//! Integration tests for decision_rules::conditions
//!
//! These tests exercise the public API of conditions:
//! - every condition variant's coverage mask, with and without negation
//! - compound folding (AND / OR / empty)
//! - structural equality and hashing
//! - column re-indexing and recursive removal of subconditions

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

use decision_rules::conditions::{Condition, LogicOperator, Relation};
use decision_rules::dataset::{Dataset, Value};
use decision_rules::error::DecisionRulesError;
use proptest::prelude::*;

fn hash_of(condition: &Condition) -> u64 {
    let mut hasher = DefaultHasher::new();
    condition.hash(&mut hasher);
    hasher.finish()
}

fn numeric_dataset(rows: Vec<Vec<f64>>) -> Dataset {
    Dataset::from_rows(rows).unwrap()
}

// ---------------------------
// Atomic conditions
// ---------------------------

/// Nominal conditions compare values as strings, nulls are never covered.
#[test]
fn nominal_condition_mask() {
    let x = Dataset::from_rows(vec![
        vec![Value::from("a")],
        vec![Value::from("b")],
        vec![Value::Null],
        vec![Value::from("a")],
    ])
    .unwrap();
    let condition = Condition::nominal(0, "a");
    assert_eq!(condition.covered_mask(&x).unwrap(), vec![true, false, false, true]);
    assert_eq!(
        condition.negate().covered_mask(&x).unwrap(),
        vec![false, true, true, false]
    );
}

/// Numbers match nominal values through their shortest string form.
#[test]
fn nominal_condition_on_numeric_column() {
    let x = numeric_dataset(vec![vec![1.0], vec![2.5], vec![1.0]]);
    assert_eq!(
        Condition::nominal(0, "1").covered_mask(&x).unwrap(),
        vec![true, false, true]
    );
    assert_eq!(
        Condition::nominal(0, "2.5").covered_mask(&x).unwrap(),
        vec![false, true, false]
    );
}

/// Interval bounds honour their closedness, NaN and nulls are not covered.
#[test]
fn elementary_condition_bounds() {
    let x = Dataset::from_rows(vec![
        vec![Value::from(0.0)],
        vec![Value::from(1.0)],
        vec![Value::from(2.0)],
        vec![Value::from(f64::NAN)],
        vec![Value::Null],
    ])
    .unwrap();

    let closed = Condition::elementary(0, 0.0, 1.0, true, true);
    assert_eq!(
        closed.covered_mask(&x).unwrap(),
        vec![true, true, false, false, false]
    );

    let open = Condition::elementary(0, 0.0, 1.0, false, false);
    assert_eq!(
        open.covered_mask(&x).unwrap(),
        vec![false, false, false, false, false]
    );

    let left_only = Condition::elementary(0, 1.0, f64::INFINITY, true, false);
    assert_eq!(
        left_only.covered_mask(&x).unwrap(),
        vec![false, true, true, false, false]
    );
}

/// Every relation operator on `X = [[1, 2], [1, 0], [1, 1]]`.
#[test]
fn attributes_relation_operators() {
    let x = numeric_dataset(vec![vec![1.0, 2.0], vec![1.0, 0.0], vec![1.0, 1.0]]);
    let expected = [
        ("=", vec![false, false, true]),
        ("!=", vec![true, true, false]),
        (">", vec![false, true, false]),
        (">=", vec![false, true, true]),
        ("<", vec![true, false, false]),
        ("<=", vec![true, false, true]),
    ];
    for (operator, mask) in expected {
        let condition = Condition::attributes_relation(0, 1, operator).unwrap();
        assert_eq!(condition.covered_mask(&x).unwrap(), mask, "operator {operator}");
    }
}

/// A negated relation covers exactly the complement of the relation.
#[test]
fn attributes_relation_negation_matches_complement() {
    let x = numeric_dataset(vec![vec![1.0, 2.0], vec![1.0, 0.0], vec![1.0, 1.0]]);
    for relation in Relation::ALL {
        let negated = Condition::attributes_relation(0, 1, relation.symbol())
            .unwrap()
            .negate();
        let complement = Condition::attributes_relation(0, 1, relation.complement().symbol()).unwrap();
        assert_eq!(
            negated.covered_mask(&x).unwrap(),
            complement.covered_mask(&x).unwrap()
        );
    }
}

/// Unsupported operators fail at construction and list the valid ones.
#[test]
fn attributes_relation_rejects_unknown_operator() {
    let err = Condition::attributes_relation(0, 1, "<>").unwrap_err();
    match err {
        DecisionRulesError::InvalidRelationOperator { operator, supported } => {
            assert_eq!(operator, "<>");
            assert!(supported.contains(">="));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

/// N-ary equality across columns.
#[test]
fn nominal_attributes_equality_mask() {
    let x = numeric_dataset(vec![
        vec![0.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![1.0, 1.0, 1.0],
        vec![1.0, 0.0, 1.0],
        vec![1.0, 1.0, 0.0],
    ]);
    let two = Condition::nominal_attributes_equality(vec![0, 1]);
    assert_eq!(
        two.covered_mask(&x).unwrap(),
        vec![true, false, true, false, true]
    );
    let three = Condition::nominal_attributes_equality(vec![0, 1, 2]);
    assert_eq!(
        three.covered_mask(&x).unwrap(),
        vec![true, false, true, false, false]
    );
}

/// Rows with a null are excluded from the raw mask and covered once negated.
#[test]
fn nominal_attributes_equality_nulls() {
    let x = Dataset::from_rows(vec![
        vec![Value::from("a"), Value::from("a")],
        vec![Value::Null, Value::from("a")],
        vec![Value::Null, Value::Null],
    ])
    .unwrap();
    let condition = Condition::nominal_attributes_equality(vec![0, 1]);
    assert_eq!(condition.covered_mask(&x).unwrap(), vec![true, false, false]);
    assert_eq!(
        condition.negate().covered_mask(&x).unwrap(),
        vec![false, true, true]
    );
}

/// Discrete set membership.
#[test]
fn discrete_set_mask() {
    let x = Dataset::from_rows(vec![
        vec![Value::from("red")],
        vec![Value::from("green")],
        vec![Value::from("blue")],
    ])
    .unwrap();
    let condition = Condition::discrete_set(0, ["red", "blue"]);
    assert_eq!(condition.covered_mask(&x).unwrap(), vec![true, false, true]);
}

// ---------------------------
// Compound conditions
// ---------------------------

/// AND / OR fold and the empty compound covering every row.
#[test]
fn compound_fold() {
    let x = numeric_dataset(vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]]);
    let low = Condition::elementary(0, f64::NEG_INFINITY, 1.0, false, true);
    let high = Condition::elementary(0, 1.0, f64::INFINITY, true, false);

    let and = Condition::and(vec![low.clone(), high.clone()]);
    assert_eq!(and.covered_mask(&x).unwrap(), vec![false, true, false, false]);

    let or = Condition::or(vec![low, high]);
    assert_eq!(or.covered_mask(&x).unwrap(), vec![true, true, true, true]);

    let empty = Condition::and(vec![]);
    assert_eq!(empty.covered_mask(&x).unwrap(), vec![true; 4]);
    assert_eq!(empty.negate().covered_mask(&x).unwrap(), vec![false; 4]);
}

/// Attributes of a compound are the union of its children's.
#[test]
fn compound_attributes_union() {
    let condition = Condition::and(vec![
        Condition::nominal(2, "a"),
        Condition::or(vec![
            Condition::elementary(0, 0.0, 1.0, true, true),
            Condition::attributes_relation(0, 3, "<").unwrap(),
        ]),
    ]);
    assert_eq!(condition.attributes(), BTreeSet::from([0, 2, 3]));
    assert_eq!(condition.conditions_count(), 3);
}

/// Errors from children propagate through the compound.
#[test]
fn compound_propagates_missing_column() {
    let x = numeric_dataset(vec![vec![0.0]]);
    let condition = Condition::and(vec![Condition::nominal(5, "a")]);
    assert!(matches!(
        condition.covered_mask(&x),
        Err(DecisionRulesError::AttributeNotFound(_))
    ));
}

// ---------------------------
// Equality and hashing
// ---------------------------

/// Compound equality ignores child order but not operator or negation.
#[test]
fn compound_equality_is_order_independent() {
    let a = Condition::nominal(0, "a");
    let b = Condition::elementary(1, 0.0, f64::INFINITY, true, false);

    let ab = Condition::and(vec![a.clone(), b.clone()]);
    let ba = Condition::and(vec![b.clone(), a.clone()]);
    assert_eq!(ab, ba);
    assert_eq!(hash_of(&ab), hash_of(&ba));

    assert_ne!(ab, Condition::or(vec![a.clone(), b.clone()]));
    assert_ne!(ab, ba.clone().negate());
    assert_ne!(ab, Condition::and(vec![a]));
}

/// Equal atomic conditions hash equally, different variants never compare equal.
#[test]
fn atomic_equality_and_hash() {
    let first = Condition::elementary(0, 0.0, 1.0, true, false);
    let second = Condition::elementary(0, -0.0, 1.0, true, false);
    assert_eq!(first, second);
    assert_eq!(hash_of(&first), hash_of(&second));

    assert_ne!(
        Condition::nominal(0, "a"),
        Condition::discrete_set(0, ["a"])
    );
    assert_ne!(Condition::nominal(0, "a"), Condition::nominal(0, "a").negate());
}

/// Conditions serialize and deserialize to structurally equal values.
#[test]
fn condition_serde_round_trip() {
    let condition = Condition::and(vec![
        Condition::nominal(0, "a").negate(),
        Condition::or(vec![
            Condition::elementary(1, 0.5, 3.0, false, true),
            Condition::discrete_set(2, ["x", "y"]),
        ]),
        Condition::attributes_relation(1, 3, ">=").unwrap(),
        Condition::nominal_attributes_equality(vec![0, 2]),
    ]);
    let json = serde_json::to_string(&condition).unwrap();
    let restored: Condition = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, condition);
}

// ---------------------------
// Re-indexing and removal
// ---------------------------

/// Column indices are remapped recursively.
#[test]
fn update_column_indices_recurses() {
    let mut condition = Condition::and(vec![
        Condition::nominal(0, "a"),
        Condition::or(vec![Condition::attributes_relation(1, 0, "=").unwrap()]),
    ]);
    let mapping = HashMap::from([(0, 1), (1, 0)]);
    condition.update_column_indices(&mapping).unwrap();

    let expected = Condition::and(vec![
        Condition::nominal(1, "a"),
        Condition::or(vec![Condition::attributes_relation(0, 1, "=").unwrap()]),
    ]);
    assert_eq!(condition, expected);

    let err = condition.update_column_indices(&HashMap::from([(0, 0)]));
    assert!(matches!(err, Err(DecisionRulesError::AttributeNotFound(_))));
}

/// Removal reaches nested compounds and drops compounds it empties.
#[test]
fn remove_condition_recursively_nested() {
    let a = Condition::nominal(0, "a");
    let b = Condition::nominal(1, "b");
    let c = Condition::nominal(2, "c");
    let premise = Condition::and(vec![a.clone(), Condition::or(vec![b.clone(), c.clone()])]);

    let without_b = premise.remove_condition_recursively(&b).unwrap();
    assert_eq!(
        without_b,
        Condition::and(vec![a.clone(), Condition::or(vec![c.clone()])])
    );

    let nested = Condition::and(vec![a.clone(), Condition::or(vec![b.clone()])]);
    assert_eq!(
        nested.remove_condition_recursively(&b).unwrap(),
        Condition::and(vec![a.clone()])
    );

    let single = Condition::and(vec![a.clone()]);
    let emptied = single.remove_condition_recursively(&a).unwrap();
    assert!(emptied.is_compound());
    assert!(emptied.subconditions().is_empty());

    assert!(a.remove_condition_recursively(&a).is_none());
}

/// Atomic leaves are deduplicated and reported in order of appearance.
#[test]
fn atomic_conditions_deduplicated() {
    let a = Condition::nominal(0, "a");
    let b = Condition::nominal(1, "b");
    let premise = Condition::and(vec![a.clone(), Condition::or(vec![b.clone(), a.clone()])]);
    assert_eq!(premise.atomic_conditions(), vec![&a, &b]);
}

/// Removing a child from an AND widens coverage, from an OR narrows it.
#[test]
fn removal_monotonicity() {
    let x = numeric_dataset(vec![vec![0.0, 5.0], vec![1.0, 6.0], vec![2.0, 7.0], vec![3.0, 8.0]]);
    let first = Condition::elementary(0, 1.0, f64::INFINITY, true, false);
    let second = Condition::elementary(1, f64::NEG_INFINITY, 7.0, false, true);

    let and = Condition::and(vec![first.clone(), second.clone()]);
    let and_mask = and.covered_mask(&x).unwrap();
    let and_removed = and
        .remove_condition_recursively(&second)
        .unwrap()
        .covered_mask(&x)
        .unwrap();
    assert!(and_mask.iter().zip(&and_removed).all(|(before, after)| !before || *after));

    let or = Condition::or(vec![first, second.clone()]);
    let or_mask = or.covered_mask(&x).unwrap();
    let or_removed = or
        .remove_condition_recursively(&second)
        .unwrap()
        .covered_mask(&x)
        .unwrap();
    assert!(or_removed.iter().zip(&or_mask).all(|(after, before)| !after || *before));
}

// ---------------------------
// Properties
// ---------------------------

fn arb_atomic() -> impl Strategy<Value = Condition> {
    prop_oneof![
        (0usize..3, prop::sample::select(vec!["a", "b", "c"]))
            .prop_map(|(column, value)| Condition::nominal(column, value)),
        (0usize..3, -5.0f64..5.0, 0.0f64..5.0, any::<bool>(), any::<bool>()).prop_map(
            |(column, left, width, left_closed, right_closed)| {
                Condition::elementary(column, left, left + width, left_closed, right_closed)
            }
        ),
        (0usize..3, 0usize..3, prop::sample::select(vec!["=", "!=", ">", ">=", "<", "<="]))
            .prop_map(|(l, r, op)| Condition::attributes_relation(l, r, op).unwrap()),
        Just(Condition::nominal_attributes_equality(vec![0, 1])),
        Just(Condition::discrete_set(1, ["a", "1"])),
    ]
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    let leaf = (arb_atomic(), any::<bool>()).prop_map(|(c, negated)| if negated { c.negate() } else { c });
    leaf.prop_recursive(3, 12, 4, |inner| {
        (
            prop::collection::vec(inner, 0..4),
            prop::bool::ANY,
            prop::bool::ANY,
        )
            .prop_map(|(children, is_and, negated)| {
                let operator = if is_and {
                    LogicOperator::Conjunction
                } else {
                    LogicOperator::Alternative
                };
                let compound = Condition::compound(children, operator);
                if negated {
                    compound.negate()
                } else {
                    compound
                }
            })
    })
}

fn arb_dataset() -> impl Strategy<Value = Dataset> {
    let cell = prop_oneof![
        Just(Value::Null),
        (-5.0f64..5.0).prop_map(Value::from),
        prop::sample::select(vec!["a", "b", "c", "1"]).prop_map(Value::from),
    ];
    prop::collection::vec(prop::collection::vec(cell, 3), 1..12)
        .prop_map(|rows| Dataset::from_rows(rows).unwrap())
}

proptest! {
    /// Masks have one entry per row, negation inverts them and is an involution.
    #[test]
    fn mask_length_and_negation(condition in arb_condition(), x in arb_dataset()) {
        let mask = condition.covered_mask(&x).unwrap();
        prop_assert_eq!(mask.len(), x.n_rows());

        let negated = condition.clone().negate();
        let negated_mask = negated.covered_mask(&x).unwrap();
        prop_assert!(mask.iter().zip(&negated_mask).all(|(a, b)| a != b));

        let twice = negated.negate();
        prop_assert_eq!(&twice, &condition);
        prop_assert_eq!(twice.covered_mask(&x).unwrap(), mask);
    }

    /// Equal conditions hash equally.
    #[test]
    fn equality_implies_equal_hash(condition in arb_condition()) {
        let copy = condition.clone();
        prop_assert_eq!(&copy, &condition);
        prop_assert_eq!(hash_of(&copy), hash_of(&condition));
    }
}
