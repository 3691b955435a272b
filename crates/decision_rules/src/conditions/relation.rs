use super::{column_name, remap_index, Predicate};
use crate::conf::FormatOptions;
use crate::dataset::{Dataset, Value};
use crate::error::{DecisionRulesError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "<")]
    Lower,
    #[serde(rename = "<=")]
    LowerEqual,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::Equal,
        Relation::NotEqual,
        Relation::Greater,
        Relation::GreaterEqual,
        Relation::Lower,
        Relation::LowerEqual,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::NotEqual => "!=",
            Relation::Greater => ">",
            Relation::GreaterEqual => ">=",
            Relation::Lower => "<",
            Relation::LowerEqual => "<=",
        }
    }

    /// Relation holding exactly when `self` does not.
    pub fn complement(&self) -> Relation {
        match self {
            Relation::Equal => Relation::NotEqual,
            Relation::NotEqual => Relation::Equal,
            Relation::Greater => Relation::LowerEqual,
            Relation::GreaterEqual => Relation::Lower,
            Relation::Lower => Relation::GreaterEqual,
            Relation::LowerEqual => Relation::Greater,
        }
    }

    /// Incomparable pairs (nulls, NaN, string vs. number) only satisfy `!=`.
    pub fn holds(&self, left: &Value, right: &Value) -> bool {
        let ordering = left.compare(right);
        match self {
            Relation::Equal => ordering == Some(Ordering::Equal),
            Relation::NotEqual => ordering != Some(Ordering::Equal),
            Relation::Greater => ordering == Some(Ordering::Greater),
            Relation::GreaterEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
            Relation::Lower => ordering == Some(Ordering::Less),
            Relation::LowerEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

impl FromStr for Relation {
    type Err = DecisionRulesError;

    fn from_str(s: &str) -> Result<Self> {
        Relation::ALL
            .into_iter()
            .find(|relation| relation.symbol() == s)
            .ok_or_else(|| DecisionRulesError::InvalidRelationOperator {
                operator: s.to_string(),
                supported: Relation::ALL.map(|r| r.symbol()).join(", "),
            })
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Relation between two columns of the same row, e.g. `petal_length > sepal_width`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributesRelationCondition {
    pub column_left: usize,
    pub column_right: usize,
    pub operator: Relation,
}

impl AttributesRelationCondition {
    /// Fails with a configuration error when `operator` is not one of `=, !=, >, >=, <, <=`.
    pub fn new(column_left: usize, column_right: usize, operator: &str) -> Result<Self> {
        Ok(Self::with_relation(
            column_left,
            column_right,
            operator.parse()?,
        ))
    }

    pub fn with_relation(column_left: usize, column_right: usize, operator: Relation) -> Self {
        Self {
            column_left,
            column_right,
            operator,
        }
    }
}

impl Predicate for AttributesRelationCondition {
    fn _covered_mask(&self, x: &Dataset) -> Result<Vec<bool>> {
        let left = x.column(self.column_left)?;
        let right = x.column(self.column_right)?;
        Ok(left
            .iter()
            .zip(right)
            .map(|(l, r)| self.operator.holds(l, r))
            .collect())
    }

    fn attributes(&self) -> BTreeSet<usize> {
        BTreeSet::from([self.column_left, self.column_right])
    }

    fn update_column_indices(&mut self, mapping: &HashMap<usize, usize>) -> Result<()> {
        self.column_left = remap_index(mapping, self.column_left)?;
        self.column_right = remap_index(mapping, self.column_right)?;
        Ok(())
    }

    fn to_string(
        &self,
        negated: bool,
        columns_names: &[String],
        _options: &FormatOptions,
    ) -> Result<String> {
        let operator = if negated {
            self.operator.complement()
        } else {
            self.operator
        };
        Ok(format!(
            "{} {} {}",
            column_name(columns_names, self.column_left)?,
            operator,
            column_name(columns_names, self.column_right)?
        ))
    }
}
