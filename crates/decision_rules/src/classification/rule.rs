use crate::conditions::Condition;
use crate::conf::FormatOptions;
use crate::coverage::Coverage;
use crate::dataset::{count_true, Dataset, Value};
use crate::error::Result;
use crate::rule::{Rule, RuleId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Class predicted by a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationConclusion {
    pub value: Value,
    pub column_name: String,
}

impl ClassificationConclusion {
    pub fn new(value: impl Into<Value>, column_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            column_name: column_name.into(),
        }
    }

    /// Rows whose label equals the predicted class.
    pub fn positives_mask(&self, y: &[Value]) -> Vec<bool> {
        y.iter().map(|label| label.nominal_eq(&self.value)).collect()
    }

    /// Rows labelled with another class. Rows without a label are neither
    /// positive nor negative.
    pub fn negatives_mask(&self, y: &[Value]) -> Vec<bool> {
        y.iter()
            .map(|label| !label.is_null() && !label.nominal_eq(&self.value))
            .collect()
    }
}

impl fmt::Display for ClassificationConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {{{}}}", self.column_name, self.value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub uuid: RuleId,
    pub premise: Condition,
    pub conclusion: ClassificationConclusion,
    pub column_names: Vec<String>,
    pub coverage: Option<Coverage>,
    pub voting_weight: Option<f64>,
}

impl ClassificationRule {
    pub fn new(
        premise: Condition,
        conclusion: ClassificationConclusion,
        column_names: Vec<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            premise,
            conclusion,
            column_names,
            coverage: None,
            voting_weight: None,
        }
    }

    /// Store coverage computed elsewhere, e.g. restored from a trained model.
    pub fn set_coverage(&mut self, coverage: Coverage) {
        self.coverage = Some(coverage);
    }

    pub fn set_voting_weight(&mut self, voting_weight: f64) {
        self.voting_weight = Some(voting_weight);
    }

    pub fn to_string(&self) -> Result<String> {
        self.to_string_with(&FormatOptions::default())
    }

    /// `IF <premise> THEN <column> = {<class>}`.
    pub fn to_string_with(&self, options: &FormatOptions) -> Result<String> {
        Ok(format!(
            "IF {} THEN {}",
            self.premise.to_string_with(&self.column_names, options)?,
            self.conclusion
        ))
    }

    fn covered_and(&self, x: &Dataset, y: &[Value], positive: bool) -> Result<Vec<bool>> {
        x.check_target_len(y.len())?;
        let covered = self.premise.covered_mask(x)?;
        let labelled = if positive {
            self.conclusion.positives_mask(y)
        } else {
            self.conclusion.negatives_mask(y)
        };
        Ok(covered
            .into_iter()
            .zip(labelled)
            .map(|(c, l)| c && l)
            .collect())
    }
}

/// Same premise, conclusion and coverage. Ids are ignored.
impl PartialEq for ClassificationRule {
    fn eq(&self, other: &Self) -> bool {
        self.premise == other.premise
            && self.conclusion == other.conclusion
            && self.coverage == other.coverage
    }
}

impl Rule for ClassificationRule {
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
        ClassificationRule::new(premise, self.conclusion.clone(), self.column_names.clone())
    }

    fn positive_covered_mask(&self, x: &Dataset, y: &[Value]) -> Result<Vec<bool>> {
        self.covered_and(x, y, true)
    }

    fn negative_covered_mask(&self, x: &Dataset, y: &[Value]) -> Result<Vec<bool>> {
        self.covered_and(x, y, false)
    }

    /// `P` counts rows of the predicted class, `N` rows of any other class.
    /// Rows with a null label count in neither.
    fn calculate_coverage(&self, x: &Dataset, y: &[Value]) -> Result<Coverage> {
        x.check_target_len(y.len())?;
        let covered = self.premise.covered_mask(x)?;
        let positives = self.conclusion.positives_mask(y);
        let negatives = self.conclusion.negatives_mask(y);

        let (mut p, mut n) = (0, 0);
        for ((c, is_positive), is_negative) in covered.iter().zip(&positives).zip(&negatives) {
            if *c && *is_positive {
                p += 1;
            } else if *c && *is_negative {
                n += 1;
            }
        }
        Coverage::new(p, n, count_true(&positives), count_true(&negatives))
    }
}
