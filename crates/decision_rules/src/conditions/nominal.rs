use super::{column_name, remap_index, Predicate};
use crate::conf::FormatOptions;
use crate::dataset::{Dataset, Value};
use crate::error::Result;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ---------------------------
// NominalCondition
// ---------------------------

/// `attribute = {value}`, values compared as strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NominalCondition {
    pub column_index: usize,
    pub value: String,
}

impl NominalCondition {
    pub fn new(column_index: usize, value: impl Into<String>) -> Self {
        Self {
            column_index,
            value: value.into(),
        }
    }
}

impl Predicate for NominalCondition {
    fn _covered_mask(&self, x: &Dataset) -> Result<Vec<bool>> {
        Ok(x
            .column(self.column_index)?
            .iter()
            .map(|v| v.as_nominal().is_some_and(|s| s == self.value.as_str()))
            .collect())
    }

    fn attributes(&self) -> BTreeSet<usize> {
        BTreeSet::from([self.column_index])
    }

    fn update_column_indices(&mut self, mapping: &HashMap<usize, usize>) -> Result<()> {
        self.column_index = remap_index(mapping, self.column_index)?;
        Ok(())
    }

    fn to_string(
        &self,
        negated: bool,
        columns_names: &[String],
        _options: &FormatOptions,
    ) -> Result<String> {
        let name = column_name(columns_names, self.column_index)?;
        Ok(format!(
            "{} {}= {{{}}}",
            name,
            if negated { "!" } else { "" },
            self.value
        ))
    }
}

// ---------------------------
// DiscreteSetCondition
// ---------------------------

/// `color = {red, green}`: the column value belongs to a finite set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteSetCondition {
    pub column_index: usize,
    pub values_set: BTreeSet<String>,
}

impl DiscreteSetCondition {
    pub fn new<I, S>(column_index: usize, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column_index,
            values_set: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Predicate for DiscreteSetCondition {
    fn _covered_mask(&self, x: &Dataset) -> Result<Vec<bool>> {
        Ok(x
            .column(self.column_index)?
            .iter()
            .map(|v| {
                v.as_nominal()
                    .is_some_and(|s| self.values_set.contains(&*s))
            })
            .collect())
    }

    fn attributes(&self) -> BTreeSet<usize> {
        BTreeSet::from([self.column_index])
    }

    fn update_column_indices(&mut self, mapping: &HashMap<usize, usize>) -> Result<()> {
        self.column_index = remap_index(mapping, self.column_index)?;
        Ok(())
    }

    fn to_string(
        &self,
        negated: bool,
        columns_names: &[String],
        _options: &FormatOptions,
    ) -> Result<String> {
        let name = column_name(columns_names, self.column_index)?;
        Ok(format!(
            "{} {}= {{{}}}",
            name,
            if negated { "!" } else { "" },
            self.values_set.iter().join(", ")
        ))
    }
}

// ---------------------------
// NominalAttributesEqualityCondition
// ---------------------------

/// `attr1 = attr2 = attr3`: all listed columns hold the same nominal value.
/// Rows with a null in any of the columns are never covered by the raw mask.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NominalAttributesEqualityCondition {
    pub column_indices: Vec<usize>,
}

impl NominalAttributesEqualityCondition {
    pub fn new(column_indices: Vec<usize>) -> Self {
        Self { column_indices }
    }
}

impl Predicate for NominalAttributesEqualityCondition {
    fn _covered_mask(&self, x: &Dataset) -> Result<Vec<bool>> {
        let columns: Vec<&[Value]> = self
            .column_indices
            .iter()
            .map(|idx| x.column(*idx))
            .collect::<Result<_>>()?;

        let Some((first, rest)) = columns.split_first() else {
            return Ok(vec![true; x.n_rows()]);
        };

        Ok((0..x.n_rows())
            .map(|row| {
                let Some(reference) = first[row].as_nominal() else {
                    return false;
                };
                rest.iter().all(|col| {
                    col[row]
                        .as_nominal()
                        .is_some_and(|value| value == reference)
                })
            })
            .collect())
    }

    fn attributes(&self) -> BTreeSet<usize> {
        self.column_indices.iter().copied().collect()
    }

    fn update_column_indices(&mut self, mapping: &HashMap<usize, usize>) -> Result<()> {
        self.column_indices = self
            .column_indices
            .iter()
            .map(|idx| remap_index(mapping, *idx))
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn to_string(
        &self,
        negated: bool,
        columns_names: &[String],
        _options: &FormatOptions,
    ) -> Result<String> {
        let names: Vec<&str> = self
            .column_indices
            .iter()
            .map(|idx| column_name(columns_names, *idx))
            .collect::<Result<_>>()?;
        let operator = if negated { " != " } else { " = " };
        Ok(names.join(operator))
    }
}
