//! Condition importances by premise ablation.
//!
//! For every atomic condition `c` of a rule with quality `q`:
//!
//! * `factor * (q(rule) - q(rule without c))` when removing `c` empties the premise
//! * `factor * (q(rule) - q(rule without c) + q(rule with only c))` otherwise
//!
//! where `factor = 1 / number of top-level conditions`. Contributions of the
//! same condition are summed over all rules containing it.
//!
//! Attribute importances sum the importances of every condition using the
//! attribute.

use crate::conditions::{Condition, LogicOperator};
use crate::error::Result;
use crate::rule::Rule;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionImportance {
    pub condition: String,
    pub attributes: Vec<String>,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeImportance {
    pub attribute: String,
    pub importance: f64,
}

/// Decreasing importance, NaN last.
fn by_decreasing_importance(a: f64, b: f64) -> Ordering {
    a.is_nan().cmp(&b.is_nan()).then_with(|| b.total_cmp(&a))
}

/// Importance of every atomic condition of `rules`, sorted by decreasing
/// importance with NaN importances last. Conditions with equal importance
/// keep their order of first appearance.
///
/// `quality` scores a rule on the caller's dataset. The rules themselves are
/// never modified: ablated variants are built from clones.
pub fn calculate_condition_importances<R, Q>(
    rules: &[R],
    column_names: &[String],
    quality: Q,
) -> Result<Vec<ConditionImportance>>
where
    R: Rule,
    Q: Fn(&R) -> Result<f64> + Sync,
{
    let rules: Vec<R> = rules.to_vec();
    let conditions_with_rules = group_rules_by_condition(&rules);
    debug!(
        rules = rules.len(),
        conditions = conditions_with_rules.len(),
        "calculating condition importances"
    );

    let importances: Vec<(Condition, f64)> = conditions_with_rules
        .into_par_iter()
        .map(|(condition, rule_indices)| {
            let importance = rule_indices
                .iter()
                .map(|&index| condition_index(&condition, &rules[index], &quality))
                .sum::<Result<f64>>()?;
            Ok((condition, importance))
        })
        .collect::<Result<_>>()?;

    let mut records: Vec<ConditionImportance> = importances
        .into_iter()
        .map(|(condition, importance)| {
            let attributes = condition
                .attributes()
                .into_iter()
                .map(|index| {
                    crate::conditions::column_name(column_names, index).map(str::to_string)
                })
                .collect::<Result<_>>()?;
            Ok(ConditionImportance {
                condition: condition.to_string(column_names)?,
                attributes,
                importance,
            })
        })
        .collect::<Result<_>>()?;

    records.sort_by(|a, b| by_decreasing_importance(a.importance, b.importance));
    Ok(records)
}

/// Sum of the importances of the conditions using each attribute, sorted like
/// condition importances. A condition over several attributes contributes its
/// full importance to each of them.
pub fn calculate_attribute_importances(
    condition_importances: &[ConditionImportance],
) -> Vec<AttributeImportance> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut records: Vec<AttributeImportance> = Vec::new();
    for record in condition_importances {
        for attribute in &record.attributes {
            match positions.get(attribute.as_str()) {
                Some(&position) => records[position].importance += record.importance,
                None => {
                    positions.insert(attribute.as_str(), records.len());
                    records.push(AttributeImportance {
                        attribute: attribute.clone(),
                        importance: record.importance,
                    });
                }
            }
        }
    }
    records.sort_by(|a, b| by_decreasing_importance(a.importance, b.importance));
    records
}

/// Distinct atomic conditions with the indices of the rules containing them,
/// in order of first appearance.
fn group_rules_by_condition<R: Rule>(rules: &[R]) -> Vec<(Condition, Vec<usize>)> {
    let mut positions: HashMap<&Condition, usize> = HashMap::new();
    let mut groups: Vec<(Condition, Vec<usize>)> = Vec::new();
    for (rule_index, rule) in rules.iter().enumerate() {
        for condition in rule.premise().atomic_conditions() {
            match positions.get(condition) {
                Some(&position) => groups[position].1.push(rule_index),
                None => {
                    positions.insert(condition, groups.len());
                    groups.push((condition.clone(), vec![rule_index]));
                }
            }
        }
    }
    groups
}

fn condition_index<R, Q>(condition: &Condition, rule: &R, quality: &Q) -> Result<f64>
where
    R: Rule,
    Q: Fn(&R) -> Result<f64>,
{
    let premise = rule.premise();
    let (top_level_count, logic_operator) = match premise.as_compound() {
        Some(compound) => (compound.subconditions.len(), compound.logic_operator),
        None => (1, LogicOperator::Conjunction),
    };
    let factor = 1.0 / top_level_count as f64;
    let rule_quality = quality(rule)?;

    match premise.remove_condition_recursively(condition) {
        Some(remaining) if !(remaining.is_compound() && remaining.subconditions().is_empty()) => {
            let without = rule.with_premise(remaining);
            let only = rule.with_premise(Condition::compound(
                vec![condition.clone()],
                logic_operator,
            ));
            Ok(factor * (rule_quality - quality(&without)? + quality(&only)?))
        }
        _ => {
            let empty = rule.with_premise(Condition::compound(Vec::new(), logic_operator));
            Ok(factor * (rule_quality - quality(&empty)?))
        }
    }
}
