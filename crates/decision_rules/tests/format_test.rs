//! Integration tests for rendering conditions and numbers

use decision_rules::conditions::Condition;
use decision_rules::conf::FormatOptions;

fn names() -> Vec<String> {
    ["attr", "other", "color"].iter().map(|s| s.to_string()).collect()
}

// ---------------------------
// Numbers
// ---------------------------

#[test]
fn format_float_precision_and_grouping() {
    let options = FormatOptions::default();
    assert_eq!(options.format_float(1.0), "1.00");
    assert_eq!(options.format_float(1234.5), "1,234.50");
    assert_eq!(options.format_float(-1234567.891), "-1,234,567.89");
    assert_eq!(options.format_float(-0.001), "0.00");
    assert_eq!(options.format_float(f64::INFINITY), "inf");
    assert_eq!(options.format_float(f64::NEG_INFINITY), "-inf");
    assert_eq!(options.format_float(f64::NAN), "nan");

    let precise = FormatOptions {
        float_display_precision: 4,
        ..FormatOptions::default()
    };
    assert_eq!(precise.format_float(0.12345), "0.1235");
}

// ---------------------------
// Conditions
// ---------------------------

/// One-sided intervals render as comparisons unless full intervals are requested.
#[test]
fn elementary_concise_and_full() {
    let condition = Condition::elementary(0, 1.0, f64::INFINITY, true, false);
    assert_eq!(condition.to_string(&names()).unwrap(), "attr >= 1.00");
    assert_eq!(
        condition.clone().negate().to_string(&names()).unwrap(),
        "attr < 1.00"
    );
    assert_eq!(
        condition
            .to_string_with(&names(), &FormatOptions::full_intervals())
            .unwrap(),
        "attr = <1.00, inf)"
    );

    let upper = Condition::elementary(0, f64::NEG_INFINITY, 2.5, false, false);
    assert_eq!(upper.to_string(&names()).unwrap(), "attr < 2.50");

    let bounded = Condition::elementary(0, -0.5, 0.25, false, true);
    assert_eq!(bounded.to_string(&names()).unwrap(), "attr = (-0.50, 0.25>");
    assert_eq!(
        bounded.negate().to_string(&names()).unwrap(),
        "attr != (-0.50, 0.25>"
    );
}

#[test]
fn nominal_and_set_strings() {
    assert_eq!(
        Condition::nominal(2, "red").to_string(&names()).unwrap(),
        "color = {red}"
    );
    assert_eq!(
        Condition::nominal(2, "red").negate().to_string(&names()).unwrap(),
        "color != {red}"
    );
    assert_eq!(
        Condition::discrete_set(2, ["red", "blue"]).to_string(&names()).unwrap(),
        "color = {blue, red}"
    );
}

/// Negated relations render with the complementary operator.
#[test]
fn relation_strings() {
    let relation = Condition::attributes_relation(0, 1, ">").unwrap();
    assert_eq!(relation.to_string(&names()).unwrap(), "attr > other");
    assert_eq!(relation.negate().to_string(&names()).unwrap(), "attr <= other");

    let equality = Condition::nominal_attributes_equality(vec![0, 1, 2]);
    assert_eq!(equality.to_string(&names()).unwrap(), "attr = other = color");
    assert_eq!(
        equality.negate().to_string(&names()).unwrap(),
        "attr != other != color"
    );
}

/// Nested compounds are parenthesised, negated ones prefixed with `!`.
#[test]
fn compound_strings() {
    let condition = Condition::and(vec![
        Condition::nominal(2, "red"),
        Condition::or(vec![
            Condition::elementary(0, 1.0, f64::INFINITY, true, false),
            Condition::attributes_relation(0, 1, "=").unwrap(),
        ]),
    ]);
    assert_eq!(
        condition.to_string(&names()).unwrap(),
        "color = {red} AND (attr >= 1.00 OR attr = other)"
    );
    assert_eq!(
        condition.negate().to_string(&names()).unwrap(),
        "!(color = {red} AND (attr >= 1.00 OR attr = other))"
    );
    assert_eq!(Condition::and(vec![]).to_string(&names()).unwrap(), "");
}

/// Unknown column indices are reported instead of panicking.
#[test]
fn missing_column_name() {
    assert!(Condition::nominal(7, "x").to_string(&names()).is_err());
}
