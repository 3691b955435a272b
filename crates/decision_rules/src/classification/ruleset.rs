use super::metrics::ClassificationRulesMetrics;
use super::rule::{ClassificationConclusion, ClassificationRule};
use crate::dataset::{Dataset, Value};
use crate::error::{DecisionRulesError, Result};
use crate::importances::{
    calculate_attribute_importances, calculate_condition_importances, AttributeImportance,
    ConditionImportance,
};
use crate::measures::{measure_by_name, MeasureFn, DEFAULT_VOTING_MEASURE};
use crate::metrics::{MetricsTable, RulesMetrics};
use crate::rule::{check_dataset, Rule, RuleSet};
use estimator_api::api::{Estimator, FitError, PredictError};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Ordered classification rules voting for their classes.
#[derive(Debug, Clone)]
pub struct ClassificationRuleSet {
    pub rules: Vec<ClassificationRule>,
    pub column_names: Vec<String>,
    pub decision_attribute: String,
    pub default_conclusion: Option<ClassificationConclusion>,
    /// Training classes in order of first appearance, with their row counts.
    pub train_classes: Vec<(Value, usize)>,
    pub voting_measure: MeasureFn,
}

impl ClassificationRuleSet {
    pub fn new(rules: Vec<ClassificationRule>, column_names: Vec<String>) -> Self {
        let decision_attribute = rules
            .first()
            .map_or_else(|| "class".to_string(), |r| r.conclusion.column_name.clone());
        Self {
            rules,
            column_names,
            decision_attribute,
            default_conclusion: None,
            train_classes: Vec::new(),
            voting_measure: DEFAULT_VOTING_MEASURE,
        }
    }

    /// Select the measure used by `Estimator::fit` by name.
    pub fn with_voting_measure(mut self, name: &str) -> Result<Self> {
        self.voting_measure = measure_by_name(name)?;
        Ok(self)
    }

    fn class_distribution(y: &[Value]) -> Vec<(Value, usize)> {
        let mut classes: Vec<(Value, usize)> = Vec::new();
        for label in y.iter().filter(|label| !label.is_null()) {
            match classes.iter_mut().find(|(class, _)| class.nominal_eq(label)) {
                Some((_, count)) => *count += 1,
                None => classes.push((label.clone(), 1)),
            }
        }
        classes
    }

    /// Compute coverage and voting weight (`measure(coverage)`) of every rule
    /// on the training data, and the default conclusion (majority class).
    pub fn update(&mut self, x: &Dataset, y: &[Value], measure: MeasureFn) -> Result<()> {
        check_dataset(x, &self.column_names, y.len())?;
        debug!(rules = self.rules.len(), rows = x.n_rows(), "updating classification ruleset");

        self.rules.par_iter_mut().try_for_each(|rule| -> Result<()> {
            let coverage = rule.calculate_coverage(x, y)?;
            let weight = measure(&coverage);
            trace!(rule = %rule.uuid, %coverage, weight, "rule updated");
            rule.coverage = Some(coverage);
            rule.voting_weight = Some(weight);
            Ok(())
        })?;

        self.train_classes = Self::class_distribution(y);
        // first seen class wins ties
        let majority = self
            .train_classes
            .iter()
            .fold(None::<&(Value, usize)>, |best, candidate| match best {
                Some(b) if b.1 >= candidate.1 => Some(b),
                _ => Some(candidate),
            });
        self.default_conclusion = majority.map(|(class, _)| {
            ClassificationConclusion::new(class.clone(), self.decision_attribute.clone())
        });
        Ok(())
    }

    fn check_updated(&self) -> Result<&ClassificationConclusion> {
        if let Some(rule) = self.rules.iter().find(|r| r.voting_weight.is_none()) {
            return Err(DecisionRulesError::InvalidState(format!(
                "rule {} has no voting weight, update the ruleset first",
                rule.uuid
            )));
        }
        self.default_conclusion.as_ref().ok_or_else(|| {
            DecisionRulesError::InvalidState(
                "ruleset has no default conclusion, update the ruleset first".to_string(),
            )
        })
    }

    /// Weighted voting of covering rules. Ties go to the class seen first in
    /// training, rows covered by no rule get the default conclusion.
    pub fn predict(&self, x: &Dataset) -> Result<Vec<Value>> {
        let default_conclusion = self.check_updated()?;
        x.check_columns(&self.column_names)?;

        let mut classes: Vec<Value> = self.train_classes.iter().map(|(c, _)| c.clone()).collect();
        let rule_classes: Vec<usize> = self
            .rules
            .iter()
            .map(|rule| {
                match classes.iter().position(|c| c.nominal_eq(&rule.conclusion.value)) {
                    Some(position) => position,
                    None => {
                        classes.push(rule.conclusion.value.clone());
                        classes.len() - 1
                    }
                }
            })
            .collect();

        let masks: Vec<Vec<bool>> = self
            .rules
            .par_iter()
            .map(|rule| rule.covered_mask(x))
            .collect::<Result<_>>()?;

        let mut defaulted = 0usize;
        let predictions = (0..x.n_rows())
            .map(|row| {
                let mut votes: Vec<Option<f64>> = vec![None; classes.len()];
                for ((rule, mask), class) in self.rules.iter().zip(&masks).zip(&rule_classes) {
                    if mask[row] {
                        let weight = rule.voting_weight.filter(|w| !w.is_nan()).unwrap_or(0.0);
                        *votes[*class].get_or_insert(0.0) += weight;
                    }
                }
                let winner = votes
                    .iter()
                    .enumerate()
                    .filter_map(|(class, vote)| vote.map(|v| (class, v)))
                    .fold(None::<(usize, f64)>, |best, (class, vote)| match best {
                        Some((_, best_vote)) if best_vote >= vote => best,
                        _ => Some((class, vote)),
                    });
                match winner {
                    Some((class, _)) => classes[class].clone(),
                    None => {
                        defaulted += 1;
                        default_conclusion.value.clone()
                    }
                }
            })
            .collect();
        debug!(rows = x.n_rows(), defaulted, "classification prediction done");
        Ok(predictions)
    }

    pub fn calculate_rules_metrics(
        &self,
        x: &Dataset,
        y: &[Value],
        metrics_to_calculate: Option<&[&str]>,
    ) -> Result<MetricsTable> {
        ClassificationRulesMetrics::new(&self.rules).calculate(x, y, metrics_to_calculate)
    }

    /// Importances per class, rules grouped by the class they predict.
    pub fn calculate_condition_importances(
        &self,
        x: &Dataset,
        y: &[Value],
        measure: MeasureFn,
    ) -> Result<BTreeMap<String, Vec<ConditionImportance>>> {
        check_dataset(x, &self.column_names, y.len())?;
        let mut by_class: Vec<(Value, Vec<ClassificationRule>)> = Vec::new();
        for rule in &self.rules {
            match by_class
                .iter_mut()
                .find(|(class, _)| class.nominal_eq(&rule.conclusion.value))
            {
                Some((_, rules)) => rules.push(rule.clone()),
                None => by_class.push((rule.conclusion.value.clone(), vec![rule.clone()])),
            }
        }

        by_class
            .into_iter()
            .map(|(class, rules)| {
                let importances = calculate_condition_importances(
                    &rules,
                    &self.column_names,
                    |rule: &ClassificationRule| Ok(measure(&rule.calculate_coverage(x, y)?)),
                )?;
                Ok((class.to_string(), importances))
            })
            .collect()
    }

    /// Attribute importances of every class from its condition importances.
    pub fn calculate_attribute_importances(
        &self,
        condition_importances: &BTreeMap<String, Vec<ConditionImportance>>,
    ) -> BTreeMap<String, Vec<AttributeImportance>> {
        condition_importances
            .iter()
            .map(|(class, importances)| (class.clone(), calculate_attribute_importances(importances)))
            .collect()
    }
}

impl RuleSet for ClassificationRuleSet {
    type Rule = ClassificationRule;

    fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    fn rules_mut(&mut self) -> &mut [ClassificationRule] {
        &mut self.rules
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn set_column_names(&mut self, column_names: Vec<String>) {
        self.column_names = column_names;
    }
}

impl Estimator for ClassificationRuleSet {
    type Input = Dataset;
    type Target = [Value];
    type Output = Vec<Value>;

    fn _fit_impl(&mut self, x: &Dataset, y: &[Value]) -> std::result::Result<(), FitError> {
        let measure = self.voting_measure;
        self.update(x, y, measure).map_err(FitError::from)
    }

    fn _predict_impl(&self, x: &Dataset) -> std::result::Result<Vec<Value>, PredictError> {
        ClassificationRuleSet::predict(self, x).map_err(PredictError::from)
    }
}
