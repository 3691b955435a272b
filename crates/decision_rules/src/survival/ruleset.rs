use super::kaplan_meier::KaplanMeierEstimator;
use super::metrics::SurvivalRulesMetrics;
use super::rule::{is_event, SurvivalConclusion, SurvivalRule};
use crate::dataset::{Dataset, Value};
use crate::error::{DecisionRulesError, Result};
use crate::importances::{
    calculate_attribute_importances, calculate_condition_importances, AttributeImportance,
    ConditionImportance,
};
use crate::metrics::{MetricsTable, RulesMetrics};
use crate::rule::{check_dataset, Rule, RuleSet};
use estimator_api::api::{Estimator, FitError, PredictError};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Ordered survival rules, each concluding the Kaplan-Meier curve of the rows
/// it covers.
#[derive(Debug, Clone)]
pub struct SurvivalRuleSet {
    pub rules: Vec<SurvivalRule>,
    pub column_names: Vec<String>,
    pub survival_time_attr: String,
    pub decision_attribute: String,
    pub default_conclusion: Option<SurvivalConclusion>,
}

impl SurvivalRuleSet {
    /// Fails when `survival_time_attr` is not one of `column_names`.
    pub fn new(
        mut rules: Vec<SurvivalRule>,
        column_names: Vec<String>,
        survival_time_attr: impl Into<String>,
    ) -> Result<Self> {
        let survival_time_attr = survival_time_attr.into();
        if !column_names.contains(&survival_time_attr) {
            return Err(DecisionRulesError::InvalidSurvivalTimeAttribute(
                survival_time_attr,
            ));
        }
        for rule in rules.iter_mut() {
            rule.survival_time_attr = survival_time_attr.clone();
        }
        let decision_attribute = rules
            .first()
            .map_or_else(|| "status".to_string(), |r| r.conclusion.column_name.clone());
        Ok(Self {
            rules,
            column_names,
            survival_time_attr,
            decision_attribute,
            default_conclusion: None,
        })
    }

    fn survival_time_index(&self) -> Result<usize> {
        self.column_names
            .iter()
            .position(|name| *name == self.survival_time_attr)
            .ok_or_else(|| {
                DecisionRulesError::InvalidSurvivalTimeAttribute(self.survival_time_attr.clone())
            })
    }

    /// Fit every rule's Kaplan-Meier estimator on its covered rows, compute its
    /// log-rank quality (also used as voting weight) and coverage. The default
    /// conclusion is the estimator of all rows.
    pub fn update(&mut self, x: &Dataset, y: &[Value]) -> Result<()> {
        check_dataset(x, &self.column_names, y.len())?;
        let time_index = self.survival_time_index()?;
        debug!(rules = self.rules.len(), rows = x.n_rows(), "updating survival ruleset");

        self.rules.par_iter_mut().try_for_each(|rule| -> Result<()> {
            let estimator = rule.fit_estimator(x, y)?;
            let log_rank = rule.calculate_log_rank(x, y)?;
            let coverage = rule.calculate_coverage(x, y)?;
            trace!(rule = %rule.uuid, %coverage, log_rank, "rule updated");
            rule.conclusion = SurvivalConclusion::from_estimator(estimator, rule.conclusion.column_name.clone());
            rule.log_rank = Some(log_rank);
            rule.voting_weight = Some(log_rank);
            rule.coverage = Some(coverage);
            Ok(())
        })?;

        let times: Vec<f64> = x
            .numeric_column(time_index)?
            .into_iter()
            .map(|time| time.unwrap_or(f64::NAN))
            .collect();
        let events: Vec<bool> = y.iter().map(is_event).collect();
        self.default_conclusion = Some(SurvivalConclusion::from_estimator(
            KaplanMeierEstimator::fit(&times, &events),
            self.decision_attribute.clone(),
        ));
        Ok(())
    }

    fn check_updated(&self) -> Result<&KaplanMeierEstimator> {
        for rule in &self.rules {
            rule.conclusion.require_estimator()?;
        }
        self.default_conclusion
            .as_ref()
            .ok_or_else(|| {
                DecisionRulesError::InvalidState(
                    "ruleset has no default conclusion, update the ruleset first".to_string(),
                )
            })?
            .require_estimator()
    }

    /// Average of the covering rules' estimators per row, the training-wide
    /// estimator for rows covered by no rule.
    pub fn predict(&self, x: &Dataset) -> Result<Vec<KaplanMeierEstimator>> {
        let default_estimator = self.check_updated()?;
        x.check_columns(&self.column_names)?;

        let masks: Vec<Vec<bool>> = self
            .rules
            .par_iter()
            .map(|rule| rule.covered_mask(x))
            .collect::<Result<_>>()?;

        let mut defaulted = 0usize;
        let mut predictions = Vec::with_capacity(x.n_rows());
        for row in 0..x.n_rows() {
            let covering: Vec<&KaplanMeierEstimator> = self
                .rules
                .iter()
                .zip(&masks)
                .filter(|(_, mask)| mask[row])
                .filter_map(|(rule, _)| rule.conclusion.estimator.as_ref())
                .collect();
            if covering.is_empty() {
                defaulted += 1;
                predictions.push(default_estimator.clone());
            } else {
                predictions.push(KaplanMeierEstimator::average(&covering));
            }
        }
        debug!(rows = x.n_rows(), defaulted, "survival prediction done");
        Ok(predictions)
    }

    pub fn calculate_rules_metrics(
        &self,
        x: &Dataset,
        y: &[Value],
        metrics_to_calculate: Option<&[&str]>,
    ) -> Result<MetricsTable> {
        SurvivalRulesMetrics::new(&self.rules).calculate(x, y, metrics_to_calculate)
    }

    /// Importances with the log-rank quality of each ablated rule.
    pub fn calculate_condition_importances(
        &self,
        x: &Dataset,
        y: &[Value],
    ) -> Result<Vec<ConditionImportance>> {
        check_dataset(x, &self.column_names, y.len())?;
        calculate_condition_importances(&self.rules, &self.column_names, |rule: &SurvivalRule| {
            rule.calculate_log_rank(x, y)
        })
    }

    pub fn calculate_attribute_importances(
        &self,
        condition_importances: &[ConditionImportance],
    ) -> Vec<AttributeImportance> {
        calculate_attribute_importances(condition_importances)
    }
}

impl RuleSet for SurvivalRuleSet {
    type Rule = SurvivalRule;

    fn rules(&self) -> &[SurvivalRule] {
        &self.rules
    }

    fn rules_mut(&mut self) -> &mut [SurvivalRule] {
        &mut self.rules
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn set_column_names(&mut self, column_names: Vec<String>) {
        self.column_names = column_names;
    }
}

impl Estimator for SurvivalRuleSet {
    type Input = Dataset;
    type Target = [Value];
    type Output = Vec<KaplanMeierEstimator>;

    fn _fit_impl(&mut self, x: &Dataset, y: &[Value]) -> std::result::Result<(), FitError> {
        self.update(x, y).map_err(FitError::from)
    }

    fn _predict_impl(&self, x: &Dataset) -> std::result::Result<Vec<KaplanMeierEstimator>, PredictError> {
        SurvivalRuleSet::predict(self, x).map_err(PredictError::from)
    }
}
