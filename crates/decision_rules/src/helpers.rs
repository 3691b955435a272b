//! Utilities over the conditions of a rule set.
//!
//! * [`ConditionsTransformer`] turns conditions into binary columns, one per
//!   condition, `1` where the condition covers the row.
//! * [`condition_frequencies`] and [`attribute_frequencies`] count how often
//!   atomic conditions and attributes occur in rule premises.

use crate::conditions::{column_name, Condition};
use crate::dataset::{Dataset, Value};
use crate::error::{DecisionRulesError, Result};
use crate::rule::Rule;
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which conditions become columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformMethod {
    /// The given conditions only.
    #[default]
    TopLevel,
    /// The given conditions and their direct subconditions.
    Split,
    /// The given conditions and all their subconditions, recursively.
    Nested,
}

impl TransformMethod {
    pub const ALL: [TransformMethod; 3] = [Self::TopLevel, Self::Split, Self::Nested];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TopLevel => "top_level",
            Self::Split => "split",
            Self::Nested => "nested",
        }
    }
}

impl fmt::Display for TransformMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformMethod {
    type Err = DecisionRulesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| DecisionRulesError::InvalidTransformMethod {
                method: s.to_string(),
                supported: Self::ALL.iter().map(|m| format!("\"{m}\"")).join(", "),
            })
    }
}

/// Binary dataset of condition coverage.
#[derive(Debug, Clone)]
pub struct ConditionsTransformer {
    pub conditions: Vec<Condition>,
}

impl ConditionsTransformer {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Transformer over the premises of `rules`.
    pub fn from_rules<R: Rule>(rules: &[R]) -> Self {
        Self::new(rules.iter().map(|rule| rule.premise().clone()).collect())
    }

    /// Distinct conditions selected by `method`, in order of first appearance.
    pub fn select_conditions<'a>(&'a self, method: TransformMethod) -> Vec<&'a Condition> {
        let mut seen: HashSet<&'a Condition> = HashSet::new();
        let mut selected: Vec<&'a Condition> = Vec::new();
        let mut push = |condition: &'a Condition| {
            if seen.insert(condition) {
                selected.push(condition);
            }
        };
        for condition in &self.conditions {
            match method {
                TransformMethod::TopLevel => push(condition),
                TransformMethod::Split => {
                    push(condition);
                    condition.subconditions().iter().for_each(&mut push);
                }
                TransformMethod::Nested => visit_nested(condition, &mut push),
            }
        }
        selected
    }

    /// One column per selected condition holding `1` for covered rows and `0`
    /// otherwise, named after the rendered condition. Selecting no condition
    /// gives an empty dataset.
    pub fn transform(
        &self,
        x: &Dataset,
        column_names: &[String],
        method: TransformMethod,
    ) -> Result<(Dataset, Vec<String>)> {
        let conditions = self.select_conditions(method);
        debug!(
            conditions = conditions.len(),
            rows = x.n_rows(),
            %method,
            "transforming dataset with conditions"
        );

        let names = conditions
            .iter()
            .map(|condition| condition.to_string(column_names))
            .collect::<Result<Vec<_>>>()?;
        let columns = conditions
            .par_iter()
            .map(|condition| {
                let mask = condition.covered_mask(x)?;
                Ok(mask
                    .into_iter()
                    .map(|covered| Value::Number(if covered { 1.0 } else { 0.0 }))
                    .collect())
            })
            .collect::<Result<Vec<Vec<Value>>>>()?;

        Ok((Dataset::from_columns(columns)?, names))
    }
}

fn visit_nested<'a>(condition: &'a Condition, push: &mut impl FnMut(&'a Condition)) {
    push(condition);
    for sub in condition.subconditions() {
        visit_nested(sub, push);
    }
}

/// Every atomic leaf of `condition`, repeated leaves included.
fn visit_leaves<'a>(condition: &'a Condition, visit: &mut impl FnMut(&'a Condition)) {
    if condition.is_compound() {
        for sub in condition.subconditions() {
            visit_leaves(sub, visit);
        }
    } else {
        visit(condition);
    }
}

/// Occurrences of every rendered atomic condition across the premises of
/// `rules`.
pub fn condition_frequencies<R: Rule>(
    rules: &[R],
    column_names: &[String],
) -> Result<BTreeMap<String, usize>> {
    let mut leaves: Vec<&Condition> = Vec::new();
    for rule in rules {
        visit_leaves(rule.premise(), &mut |leaf| leaves.push(leaf));
    }
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for leaf in leaves {
        *counts.entry(leaf.to_string(column_names)?).or_default() += 1;
    }
    Ok(counts)
}

/// Occurrences of every attribute in the atomic conditions of `rules`. A
/// condition over several attributes counts once for each of them.
pub fn attribute_frequencies<R: Rule>(
    rules: &[R],
    column_names: &[String],
) -> Result<BTreeMap<String, usize>> {
    let mut indices: Vec<usize> = Vec::new();
    for rule in rules {
        visit_leaves(rule.premise(), &mut |leaf| indices.extend(leaf.attributes()));
    }
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for index in indices {
        *counts.entry(column_name(column_names, index)?.to_string()).or_default() += 1;
    }
    Ok(counts)
}
