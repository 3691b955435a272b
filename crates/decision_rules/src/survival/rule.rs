use super::kaplan_meier::{log_rank, KaplanMeierEstimator};
use crate::conditions::Condition;
use crate::conf::{FormatOptions, DEFAULT_CONFIDENCE_LEVEL};
use crate::coverage::Coverage;
use crate::dataset::{Dataset, Value};
use crate::error::{DecisionRulesError, Result};
use crate::rule::{Rule, RuleId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Survival curve of the covered rows, summarised by its median.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalConclusion {
    /// Median survival time.
    pub value: f64,
    pub median_survival_time_ci_lower: f64,
    pub median_survival_time_ci_upper: f64,
    pub estimator: Option<KaplanMeierEstimator>,
    pub column_name: String,
}

impl SurvivalConclusion {
    pub fn new(value: f64, column_name: impl Into<String>) -> Self {
        Self {
            value,
            median_survival_time_ci_lower: f64::NAN,
            median_survival_time_ci_upper: f64::NAN,
            estimator: None,
            column_name: column_name.into(),
        }
    }

    pub fn from_estimator(estimator: KaplanMeierEstimator, column_name: impl Into<String>) -> Self {
        let (ci_lower, ci_upper) = estimator.median_survival_time_ci(DEFAULT_CONFIDENCE_LEVEL);
        Self {
            value: estimator.median_survival_time(),
            median_survival_time_ci_lower: ci_lower,
            median_survival_time_ci_upper: ci_upper,
            estimator: Some(estimator),
            column_name: column_name.into(),
        }
    }

    pub fn require_estimator(&self) -> Result<&KaplanMeierEstimator> {
        self.estimator.as_ref().ok_or_else(|| {
            DecisionRulesError::InvalidState(
                "survival conclusion has no Kaplan-Meier estimator, update the ruleset first"
                    .to_string(),
            )
        })
    }
}

/// Event indicator of a survival status, `1` meaning the event occurred.
pub fn is_event(status: &Value) -> bool {
    status.as_f64() == Some(1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurvivalRule {
    pub uuid: RuleId,
    pub premise: Condition,
    pub conclusion: SurvivalConclusion,
    pub column_names: Vec<String>,
    /// Name of the column of `x` holding survival times.
    pub survival_time_attr: String,
    pub coverage: Option<Coverage>,
    pub voting_weight: Option<f64>,
    pub log_rank: Option<f64>,
}

impl SurvivalRule {
    pub fn new(
        premise: Condition,
        conclusion: SurvivalConclusion,
        column_names: Vec<String>,
        survival_time_attr: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            premise,
            conclusion,
            column_names,
            survival_time_attr: survival_time_attr.into(),
            coverage: None,
            voting_weight: None,
            log_rank: None,
        }
    }

    pub fn to_string(&self) -> Result<String> {
        self.to_string_with(&FormatOptions::default())
    }

    /// `IF <premise> THEN survival_curve`.
    pub fn to_string_with(&self, options: &FormatOptions) -> Result<String> {
        Ok(format!(
            "IF {} THEN survival_curve",
            self.premise.to_string_with(&self.column_names, options)?
        ))
    }

    pub fn survival_time_index(&self) -> Result<usize> {
        self.column_names
            .iter()
            .position(|name| *name == self.survival_time_attr)
            .ok_or_else(|| DecisionRulesError::InvalidSurvivalTimeAttribute(self.survival_time_attr.clone()))
    }

    /// Survival times (NaN when missing) and event indicators of every row.
    pub fn survival_data(&self, x: &Dataset, y: &[Value]) -> Result<(Vec<f64>, Vec<bool>)> {
        x.check_target_len(y.len())?;
        let times = x
            .numeric_column(self.survival_time_index()?)?
            .into_iter()
            .map(|time| time.unwrap_or(f64::NAN))
            .collect();
        Ok((times, y.iter().map(is_event).collect()))
    }

    /// Log-rank quality of the rule: covered against uncovered rows.
    pub fn calculate_log_rank(&self, x: &Dataset, y: &[Value]) -> Result<f64> {
        let (times, events) = self.survival_data(x, y)?;
        let covered = self.premise.covered_mask(x)?;
        Ok(log_rank(&times, &events, &covered))
    }

    /// Kaplan-Meier estimator of the covered rows.
    pub fn fit_estimator(&self, x: &Dataset, y: &[Value]) -> Result<KaplanMeierEstimator> {
        let (times, events) = self.survival_data(x, y)?;
        let covered = self.premise.covered_mask(x)?;
        let (covered_times, covered_events): (Vec<f64>, Vec<bool>) = times
            .into_iter()
            .zip(events)
            .zip(covered)
            .filter_map(|(observation, c)| c.then_some(observation))
            .unzip();
        Ok(KaplanMeierEstimator::fit(&covered_times, &covered_events))
    }

    /// `1 - log_rank`, an invalid-state error when the log-rank was never computed.
    pub fn p_value(&self) -> Result<f64> {
        self.log_rank.map(|log_rank| 1.0 - log_rank).ok_or_else(|| {
            DecisionRulesError::InvalidState(format!(
                "log_rank has not been computed for the rule with uuid: {}",
                self.uuid
            ))
        })
    }
}

/// Same premise, conclusion and coverage. Ids are ignored.
impl PartialEq for SurvivalRule {
    fn eq(&self, other: &Self) -> bool {
        self.premise == other.premise
            && self.conclusion == other.conclusion
            && self.coverage == other.coverage
    }
}

impl Rule for SurvivalRule {
    type Label = Value;

    fn uuid(&self) -> RuleId {
        self.uuid
    }

    fn premise(&self) -> &Condition {
        &self.premise
    }

    fn premise_mut(&mut self) -> &mut Condition {
        &mut self.premise
    }

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn set_column_names(&mut self, column_names: Vec<String>) {
        self.column_names = column_names;
    }

    fn coverage(&self) -> Option<&Coverage> {
        self.coverage.as_ref()
    }

    fn voting_weight(&self) -> Option<f64> {
        self.voting_weight
    }

    fn with_premise(&self, premise: Condition) -> Self {
        SurvivalRule::new(
            premise,
            self.conclusion.clone(),
            self.column_names.clone(),
            self.survival_time_attr.clone(),
        )
    }

    /// Every covered row counts as positive.
    fn positive_covered_mask(&self, x: &Dataset, y: &[Value]) -> Result<Vec<bool>> {
        x.check_target_len(y.len())?;
        self.premise.covered_mask(x)
    }

    fn negative_covered_mask(&self, x: &Dataset, y: &[Value]) -> Result<Vec<bool>> {
        x.check_target_len(y.len())?;
        Ok(vec![false; x.n_rows()])
    }

    /// `p` = covered rows, `P` = all rows, `n = N = 0`.
    fn calculate_coverage(&self, x: &Dataset, y: &[Value]) -> Result<Coverage> {
        x.check_target_len(y.len())?;
        let covered = crate::dataset::count_true(&self.premise.covered_mask(x)?);
        Coverage::new(covered, 0, y.len(), 0)
    }
}
