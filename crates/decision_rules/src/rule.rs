//! Rule and rule set abstractions shared by all tasks.

use crate::conditions::Condition;
use crate::coverage::Coverage;
use crate::dataset::Dataset;
use crate::error::{DecisionRulesError, Result};
use crate::helpers;
use crate::measures;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

pub type RuleId = Uuid;

/// A premise with a task-specific conclusion.
///
/// Coverage and voting weight are training statistics: they stay `None`
/// until the owning rule set is updated on a dataset.
pub trait Rule: Clone + Send + Sync {
    /// Type of a single target entry (class label, numeric target, survival status).
    type Label: Send + Sync;

    fn uuid(&self) -> RuleId;

    fn premise(&self) -> &Condition;

    fn premise_mut(&mut self) -> &mut Condition;

    fn column_names(&self) -> &[String];

    fn set_column_names(&mut self, column_names: Vec<String>);

    fn coverage(&self) -> Option<&Coverage>;

    fn voting_weight(&self) -> Option<f64>;

    /// Copy of the rule with another premise. The conclusion is kept, training
    /// statistics are dropped.
    fn with_premise(&self, premise: Condition) -> Self;

    /// Rows covered by the rule and agreeing with its conclusion.
    fn positive_covered_mask(&self, x: &Dataset, y: &[Self::Label]) -> Result<Vec<bool>>;

    /// Rows covered by the rule and disagreeing with its conclusion.
    fn negative_covered_mask(&self, x: &Dataset, y: &[Self::Label]) -> Result<Vec<bool>>;

    /// Coverage of the rule on `(x, y)` for its current conclusion.
    fn calculate_coverage(&self, x: &Dataset, y: &[Self::Label]) -> Result<Coverage>;

    fn covered_mask(&self, x: &Dataset) -> Result<Vec<bool>> {
        self.premise().covered_mask(x)
    }

    /// Stored coverage, or an invalid-state error for a rule never updated.
    fn require_coverage(&self) -> Result<&Coverage> {
        self.coverage().ok_or_else(|| {
            DecisionRulesError::InvalidState(format!(
                "rule {} has no coverage, update the ruleset first",
                self.uuid()
            ))
        })
    }
}

/// Summary statistics of a rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetStats {
    pub rules_count: usize,
    pub total_conditions_count: usize,
    pub avg_conditions_count: f64,
    pub avg_precision: f64,
    pub avg_coverage: f64,
    pub avg_rule_quality: f64,
}

/// Ordered rules sharing column names.
pub trait RuleSet {
    type Rule: Rule;

    fn rules(&self) -> &[Self::Rule];

    fn rules_mut(&mut self) -> &mut [Self::Rule];

    fn column_names(&self) -> &[String];

    fn set_column_names(&mut self, column_names: Vec<String>);

    /// Remap every condition of every rule to a dataset whose columns are
    /// `new_column_names`, matching columns by name.
    fn update_using_column_names(&mut self, new_column_names: &[String]) -> Result<()> {
        let mapping: HashMap<usize, usize> = self
            .column_names()
            .iter()
            .enumerate()
            .map(|(old_index, name)| {
                new_column_names
                    .iter()
                    .position(|candidate| candidate == name)
                    .map(|new_index| (old_index, new_index))
                    .ok_or_else(|| DecisionRulesError::AttributeNotFound(name.clone()))
            })
            .collect::<Result<_>>()?;

        for rule in self.rules_mut() {
            rule.premise_mut().update_column_indices(&mapping)?;
            rule.set_column_names(new_column_names.to_vec());
        }
        self.set_column_names(new_column_names.to_vec());
        Ok(())
    }

    /// Fails with an invalid-state error when any rule was never updated.
    fn calculate_ruleset_stats(&self) -> Result<RuleSetStats> {
        let rules = self.rules();
        let rules_count = rules.len();
        let total_conditions_count: usize =
            rules.iter().map(|r| r.premise().conditions_count()).sum();

        let mut precision_sum = 0.0;
        let mut coverage_sum = 0.0;
        let mut quality_sum = 0.0;
        for rule in rules {
            let coverage = rule.require_coverage()?;
            precision_sum += measures::precision(coverage);
            coverage_sum += measures::coverage(coverage);
            quality_sum += rule.voting_weight().unwrap_or(f64::NAN);
        }

        let count = rules_count as f64;
        Ok(RuleSetStats {
            rules_count,
            total_conditions_count,
            avg_conditions_count: total_conditions_count as f64 / count,
            avg_precision: precision_sum / count,
            avg_coverage: coverage_sum / count,
            avg_rule_quality: quality_sum / count,
        })
    }

    /// Occurrences of each atomic condition across all premises.
    fn condition_frequencies(&self) -> Result<BTreeMap<String, usize>> {
        helpers::condition_frequencies(self.rules(), self.column_names())
    }

    /// Occurrences of each attribute across all atomic conditions.
    fn attribute_frequencies(&self) -> Result<BTreeMap<String, usize>> {
        helpers::attribute_frequencies(self.rules(), self.column_names())
    }
}

/// Validate a dataset and its target against a rule set's columns.
pub(crate) fn check_dataset(x: &Dataset, column_names: &[String], target_len: usize) -> Result<()> {
    x.check_columns(column_names)?;
    x.check_target_len(target_len)
}
