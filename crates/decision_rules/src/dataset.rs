//! In-memory feature table consumed by condition evaluation.
//!
//! Values are stored column by column since every condition reads whole
//! columns. Categorical values are compared as strings, numeric values as
//! `f64`; missing entries are `Value::Null`.

use crate::error::{DecisionRulesError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Nominal(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. Nominal values holding a number literal are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Number(x) => Some(*x),
            Value::Nominal(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// String view used by nominal conditions. Numbers render in their shortest form (`1`, `2.5`).
    pub fn as_nominal(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Number(x) => Some(Cow::Owned(x.to_string())),
            Value::Nominal(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }

    /// Ordering used by attribute relations: numbers numerically, strings
    /// lexicographically, mixed pairs numerically when both parse.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Nominal(a), Value::Nominal(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    /// Equality used for class labels and nominal matching.
    pub fn nominal_eq(&self, other: &Value) -> bool {
        match (self.as_nominal(), other.as_nominal()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Number(x) => write!(f, "{}", x),
            Value::Nominal(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Value::Number(x as f64)
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::Number(x as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Nominal(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Nominal(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Column-major table of `Value`s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Vec<Value>>,
    n_rows: usize,
}

impl Dataset {
    /// Build from row-major data. All rows must have the same length.
    pub fn from_rows<R, V>(rows: R) -> Result<Self>
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut columns: Vec<Vec<Value>> = Vec::new();
        let mut n_rows = 0;
        for (row_idx, row) in rows.into_iter().enumerate() {
            let row: Vec<Value> = row.into_iter().map(Into::into).collect();
            if row_idx == 0 {
                columns = (0..row.len()).map(|_| Vec::new()).collect();
            } else if row.len() != columns.len() {
                return Err(DecisionRulesError::ShapeMismatch(format!(
                    "row {} has {} values, expected {}",
                    row_idx,
                    row.len(),
                    columns.len()
                )));
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.push(value);
            }
            n_rows += 1;
        }
        Ok(Self { columns, n_rows })
    }

    /// Build from column-major data. All columns must have the same length.
    pub fn from_columns(columns: Vec<Vec<Value>>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some((idx, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_rows) {
            return Err(DecisionRulesError::ShapeMismatch(format!(
                "column {} has {} values, expected {}",
                idx,
                col.len(),
                n_rows
            )));
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn column(&self, index: usize) -> Result<&[Value]> {
        self.columns
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| DecisionRulesError::AttributeNotFound(format!("column #{index}")))
    }

    /// Numeric view of a column, `None` for nulls and non-numeric entries.
    pub fn numeric_column(&self, index: usize) -> Result<Vec<Option<f64>>> {
        Ok(self.column(index)?.iter().map(Value::as_f64).collect())
    }

    /// Check that the table has exactly the columns named in `column_names`.
    pub fn check_columns(&self, column_names: &[String]) -> Result<()> {
        if self.n_columns() < column_names.len() {
            return Err(DecisionRulesError::AttributeNotFound(
                column_names[self.n_columns()].clone(),
            ));
        }
        if self.n_columns() > column_names.len() {
            return Err(DecisionRulesError::ShapeMismatch(format!(
                "dataset has {} columns but the ruleset knows {} attributes",
                self.n_columns(),
                column_names.len()
            )));
        }
        Ok(())
    }

    /// Check that a target vector has one entry per row.
    pub fn check_target_len(&self, target_len: usize) -> Result<()> {
        if target_len != self.n_rows {
            return Err(DecisionRulesError::ShapeMismatch(format!(
                "dataset has {} rows but target has {} values",
                self.n_rows, target_len
            )));
        }
        Ok(())
    }
}

/// Number of `true` entries in a mask.
pub fn count_true(mask: &[bool]) -> usize {
    mask.iter().filter(|covered| **covered).count()
}
