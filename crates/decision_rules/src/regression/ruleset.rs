use super::metrics::RegressionRulesMetrics;
use super::rule::{RegressionConclusion, RegressionRule};
use crate::dataset::Dataset;
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
use tracing::{debug, trace};

/// Ordered regression rules averaging their estimates.
#[derive(Debug, Clone)]
pub struct RegressionRuleSet {
    pub rules: Vec<RegressionRule>,
    pub column_names: Vec<String>,
    pub decision_attribute: String,
    pub default_conclusion: Option<RegressionConclusion>,
    pub voting_measure: MeasureFn,
}

impl RegressionRuleSet {
    pub fn new(rules: Vec<RegressionRule>, column_names: Vec<String>) -> Self {
        let decision_attribute = rules
            .first()
            .map_or_else(|| "target".to_string(), |r| r.conclusion.column_name.clone());
        Self {
            rules,
            column_names,
            decision_attribute,
            default_conclusion: None,
            voting_measure: DEFAULT_VOTING_MEASURE,
        }
    }

    pub fn with_voting_measure(mut self, name: &str) -> Result<Self> {
        self.voting_measure = measure_by_name(name)?;
        Ok(self)
    }

    /// Refit every conclusion on its covered targets, then compute coverage and
    /// voting weight. The default conclusion is fitted on all targets.
    pub fn update(&mut self, x: &Dataset, y: &[f64], measure: MeasureFn) -> Result<()> {
        check_dataset(x, &self.column_names, y.len())?;
        debug!(rules = self.rules.len(), rows = x.n_rows(), "updating regression ruleset");

        self.rules.par_iter_mut().try_for_each(|rule| -> Result<()> {
            let covered_targets = rule.covered_targets(x, y)?;
            rule.conclusion.fit_covered(&covered_targets);
            let coverage = rule.calculate_coverage(x, y)?;
            let weight = measure(&coverage);
            trace!(rule = %rule.uuid, %coverage, weight, value = rule.conclusion.value, "rule updated");
            rule.coverage = Some(coverage);
            rule.voting_weight = Some(weight);
            Ok(())
        })?;

        let mut default_conclusion = RegressionConclusion::from_value(f64::NAN, self.decision_attribute.clone());
        default_conclusion.fit_covered(y);
        self.default_conclusion = Some(default_conclusion);
        Ok(())
    }

    fn check_updated(&self) -> Result<&RegressionConclusion> {
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

    /// Voting-weighted mean of the covering rules' values. Falls back to the
    /// plain mean when the weights do not sum to a positive number, and to the
    /// training mean for rows covered by no rule.
    pub fn predict(&self, x: &Dataset) -> Result<Vec<f64>> {
        let default_conclusion = self.check_updated()?;
        x.check_columns(&self.column_names)?;

        let masks: Vec<Vec<bool>> = self
            .rules
            .par_iter()
            .map(|rule| rule.covered_mask(x))
            .collect::<Result<_>>()?;

        let mut defaulted = 0usize;
        let predictions = (0..x.n_rows())
            .map(|row| {
                let covering: Vec<&RegressionRule> = self
                    .rules
                    .iter()
                    .zip(&masks)
                    .filter_map(|(rule, mask)| mask[row].then_some(rule))
                    .collect();
                if covering.is_empty() {
                    defaulted += 1;
                    return default_conclusion.value;
                }
                let weights_sum: f64 = covering.iter().filter_map(|r| r.voting_weight).sum();
                if weights_sum > 0.0 {
                    covering
                        .iter()
                        .map(|r| r.conclusion.value * r.voting_weight.unwrap_or(0.0))
                        .sum::<f64>()
                        / weights_sum
                } else {
                    covering.iter().map(|r| r.conclusion.value).sum::<f64>() / covering.len() as f64
                }
            })
            .collect();
        debug!(rows = x.n_rows(), defaulted, "regression prediction done");
        Ok(predictions)
    }

    pub fn calculate_rules_metrics(
        &self,
        x: &Dataset,
        y: &[f64],
        metrics_to_calculate: Option<&[&str]>,
    ) -> Result<MetricsTable> {
        RegressionRulesMetrics::new(&self.rules).calculate(x, y, metrics_to_calculate)
    }

    pub fn calculate_condition_importances(
        &self,
        x: &Dataset,
        y: &[f64],
        measure: MeasureFn,
    ) -> Result<Vec<ConditionImportance>> {
        check_dataset(x, &self.column_names, y.len())?;
        calculate_condition_importances(&self.rules, &self.column_names, |rule: &RegressionRule| {
            Ok(measure(&rule.calculate_coverage(x, y)?))
        })
    }

    pub fn calculate_attribute_importances(
        &self,
        condition_importances: &[ConditionImportance],
    ) -> Vec<AttributeImportance> {
        calculate_attribute_importances(condition_importances)
    }
}

impl RuleSet for RegressionRuleSet {
    type Rule = RegressionRule;

    fn rules(&self) -> &[RegressionRule] {
        &self.rules
    }

    fn rules_mut(&mut self) -> &mut [RegressionRule] {
        &mut self.rules
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn set_column_names(&mut self, column_names: Vec<String>) {
        self.column_names = column_names;
    }
}

impl Estimator for RegressionRuleSet {
    type Input = Dataset;
    type Target = [f64];
    type Output = Vec<f64>;

    fn _fit_impl(&mut self, x: &Dataset, y: &[f64]) -> std::result::Result<(), FitError> {
        let measure = self.voting_measure;
        self.update(x, y, measure).map_err(FitError::from)
    }

    fn _predict_impl(&self, x: &Dataset) -> std::result::Result<Vec<f64>, PredictError> {
        RegressionRuleSet::predict(self, x).map_err(PredictError::from)
    }
}
