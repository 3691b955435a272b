use crate::conditions::Condition;
use crate::conf::FormatOptions;
use crate::coverage::Coverage;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::rule::{Rule, RuleId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numeric estimate with the interval of targets the rule considers correct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionConclusion {
    pub value: f64,
    pub low: f64,
    pub high: f64,
    pub column_name: String,
    pub train_covered_y_mean: Option<f64>,
    pub train_covered_y_std: Option<f64>,
}

impl RegressionConclusion {
    pub fn new(value: f64, low: f64, high: f64, column_name: impl Into<String>) -> Self {
        Self {
            value,
            low,
            high,
            column_name: column_name.into(),
            train_covered_y_mean: None,
            train_covered_y_std: None,
        }
    }

    /// Point estimate with a degenerate interval.
    pub fn from_value(value: f64, column_name: impl Into<String>) -> Self {
        Self::new(value, value, value, column_name)
    }

    pub fn contains(&self, target: f64) -> bool {
        target >= self.low && target <= self.high
    }

    /// Set `value = mean`, `[low, high] = [mean - std, mean + std]` from the
    /// covered targets. NaN targets are ignored; with no covered target the
    /// conclusion keeps its value and interval.
    pub fn fit_covered(&mut self, covered_targets: &[f64]) {
        let values: Vec<f64> = covered_targets.iter().copied().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            self.train_covered_y_mean = None;
            self.train_covered_y_std = None;
            return;
        }
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count).sqrt();
        self.value = mean;
        self.low = mean - std;
        self.high = mean + std;
        self.train_covered_y_mean = Some(mean);
        self.train_covered_y_std = Some(std);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionRule {
    pub uuid: RuleId,
    pub premise: Condition,
    pub conclusion: RegressionConclusion,
    pub column_names: Vec<String>,
    pub coverage: Option<Coverage>,
    pub voting_weight: Option<f64>,
}

impl RegressionRule {
    pub fn new(premise: Condition, conclusion: RegressionConclusion, column_names: Vec<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            premise,
            conclusion,
            column_names,
            coverage: None,
            voting_weight: None,
        }
    }

    pub fn to_string(&self) -> Result<String> {
        self.to_string_with(&FormatOptions::default())
    }

    /// `IF <premise> THEN <column> = {<value>} [<low>, <high>]`.
    pub fn to_string_with(&self, options: &FormatOptions) -> Result<String> {
        Ok(format!(
            "IF {} THEN {} = {{{}}} [{}, {}]",
            self.premise.to_string_with(&self.column_names, options)?,
            self.conclusion.column_name,
            options.format_float(self.conclusion.value),
            options.format_float(self.conclusion.low),
            options.format_float(self.conclusion.high),
        ))
    }

    /// Targets of the rows covered by the rule.
    pub fn covered_targets(&self, x: &Dataset, y: &[f64]) -> Result<Vec<f64>> {
        x.check_target_len(y.len())?;
        let covered = self.premise.covered_mask(x)?;
        Ok(covered
            .iter()
            .zip(y)
            .filter_map(|(c, target)| c.then_some(*target))
            .collect())
    }

    fn covered_and(&self, x: &Dataset, y: &[f64], positive: bool) -> Result<Vec<bool>> {
        x.check_target_len(y.len())?;
        let covered = self.premise.covered_mask(x)?;
        Ok(covered
            .into_iter()
            .zip(y)
            .map(|(c, target)| c && self.conclusion.contains(*target) == positive)
            .collect())
    }
}

/// Same premise, conclusion and coverage. Ids are ignored.
impl PartialEq for RegressionRule {
    fn eq(&self, other: &Self) -> bool {
        self.premise == other.premise
            && self.conclusion == other.conclusion
            && self.coverage == other.coverage
    }
}

impl Rule for RegressionRule {
    type Label = f64;

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
        RegressionRule::new(premise, self.conclusion.clone(), self.column_names.clone())
    }

    /// Covered rows whose target lies in `[low, high]`.
    fn positive_covered_mask(&self, x: &Dataset, y: &[f64]) -> Result<Vec<bool>> {
        self.covered_and(x, y, true)
    }

    fn negative_covered_mask(&self, x: &Dataset, y: &[f64]) -> Result<Vec<bool>> {
        self.covered_and(x, y, false)
    }

    /// `P` counts all rows whose target lies in `[low, high]`.
    fn calculate_coverage(&self, x: &Dataset, y: &[f64]) -> Result<Coverage> {
        x.check_target_len(y.len())?;
        let covered = self.premise.covered_mask(x)?;

        let (mut p, mut n, mut total_positives) = (0, 0, 0);
        for (c, target) in covered.iter().zip(y) {
            let positive = self.conclusion.contains(*target);
            total_positives += usize::from(positive);
            match (c, positive) {
                (true, true) => p += 1,
                (true, false) => n += 1,
                _ => {}
            }
        }
        Coverage::new(p, n, total_positives, y.len() - total_positives)
    }
}
