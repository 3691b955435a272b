use super::{Condition, Predicate};
use crate::conf::FormatOptions;
use crate::dataset::Dataset;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOperator {
    #[default]
    #[serde(rename = "CONJUNCTION")]
    Conjunction,
    #[serde(rename = "ALTERNATIVE")]
    Alternative,
}

impl LogicOperator {
    fn separator(&self) -> &'static str {
        match self {
            LogicOperator::Conjunction => " AND ",
            LogicOperator::Alternative => " OR ",
        }
    }
}

/// Conjunction or alternative of other conditions, e.g.
/// `petal_length = <-0.01, 0.18> AND sepal_width = <-0.04, 0.25>`.
///
/// An empty compound covers every row.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CompoundCondition {
    pub subconditions: Vec<Condition>,
    pub logic_operator: LogicOperator,
}

impl CompoundCondition {
    pub fn new(subconditions: Vec<Condition>, logic_operator: LogicOperator) -> Self {
        Self {
            subconditions,
            logic_operator,
        }
    }
}

/// Same operator and the same set of subconditions, order ignored.
impl PartialEq for CompoundCondition {
    fn eq(&self, other: &Self) -> bool {
        self.logic_operator == other.logic_operator
            && self
                .subconditions
                .iter()
                .all(|sub| other.subconditions.contains(sub))
            && other
                .subconditions
                .iter()
                .all(|sub| self.subconditions.contains(sub))
    }
}

impl Eq for CompoundCondition {}

impl Predicate for CompoundCondition {
    fn _covered_mask(&self, x: &Dataset) -> Result<Vec<bool>> {
        let Some((first, rest)) = self.subconditions.split_first() else {
            return Ok(vec![true; x.n_rows()]);
        };
        let mut covered_mask = first.covered_mask(x)?;
        for sub in rest {
            let sub_mask = sub.covered_mask(x)?;
            match self.logic_operator {
                LogicOperator::Conjunction => covered_mask
                    .iter_mut()
                    .zip(sub_mask)
                    .for_each(|(acc, m)| *acc &= m),
                LogicOperator::Alternative => covered_mask
                    .iter_mut()
                    .zip(sub_mask)
                    .for_each(|(acc, m)| *acc |= m),
            }
        }
        Ok(covered_mask)
    }

    fn attributes(&self) -> BTreeSet<usize> {
        self.subconditions
            .iter()
            .flat_map(|sub| sub.attributes())
            .collect()
    }

    fn update_column_indices(&mut self, mapping: &HashMap<usize, usize>) -> Result<()> {
        for sub in self.subconditions.iter_mut() {
            sub.update_column_indices(mapping)?;
        }
        Ok(())
    }

    fn to_string(
        &self,
        negated: bool,
        columns_names: &[String],
        options: &FormatOptions,
    ) -> Result<String> {
        let parts: Vec<String> = self
            .subconditions
            .iter()
            .map(|sub| {
                let rendered = sub.to_string_with(columns_names, options)?;
                Ok(if sub.is_compound() && !sub.negated {
                    format!("({rendered})")
                } else {
                    rendered
                })
            })
            .collect::<Result<_>>()?;
        let joined = parts.join(self.logic_operator.separator());
        if negated {
            Ok(format!("!({joined})"))
        } else {
            Ok(joined)
        }
    }
}
