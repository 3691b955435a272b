use super::{column_name, remap_index, Predicate};
use crate::conf::FormatOptions;
use crate::dataset::Dataset;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

/// Numeric interval condition on a single column: `left < x < right`, with
/// each bound independently closed. Unbounded sides use `±inf`.
///
/// Rendered in a rule as `petal_length = <-0.01, 0.18>` or, in the concise
/// form, as `petal_length >= -0.01`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementaryCondition {
    pub column_index: usize,
    pub left: f64,
    pub right: f64,
    pub left_closed: bool,
    pub right_closed: bool,
}

impl ElementaryCondition {
    pub fn new(
        column_index: usize,
        left: f64,
        right: f64,
        left_closed: bool,
        right_closed: bool,
    ) -> Self {
        Self {
            column_index,
            left,
            right,
            left_closed,
            right_closed,
        }
    }

    /// `x >= left` (or `x > left` when open).
    pub fn from_left(column_index: usize, left: f64, left_closed: bool) -> Self {
        Self::new(column_index, left, f64::INFINITY, left_closed, false)
    }

    /// `x <= right` (or `x < right` when open).
    pub fn from_right(column_index: usize, right: f64, right_closed: bool) -> Self {
        Self::new(column_index, f64::NEG_INFINITY, right, false, right_closed)
    }

    /// NaN never satisfies a comparison so invalid values are simply not covered.
    fn _evaluate_some(&self, x: f64) -> bool {
        let lower_check = if self.left_closed {
            x >= self.left
        } else {
            x > self.left
        };
        let upper_check = if self.right_closed {
            x <= self.right
        } else {
            x < self.right
        };
        lower_check && upper_check
    }

    fn concise_string(&self, column_name: &str, negated: bool, options: &FormatOptions) -> String {
        let (sign, value) = if self.left == f64::NEG_INFINITY {
            let sign = match (negated, self.right_closed) {
                (true, true) => ">",
                (true, false) => ">=",
                (false, true) => "<=",
                (false, false) => "<",
            };
            (sign, self.right)
        } else {
            let sign = match (negated, self.left_closed) {
                (true, true) => "<",
                (true, false) => "<=",
                (false, true) => ">=",
                (false, false) => ">",
            };
            (sign, self.left)
        };
        format!("{} {} {}", column_name, sign, options.format_float(value))
    }
}

fn bound_bits(x: f64) -> u64 {
    if x == 0.0 {
        0.0_f64.to_bits()
    } else if x.is_nan() {
        f64::NAN.to_bits()
    } else {
        x.to_bits()
    }
}

impl PartialEq for ElementaryCondition {
    fn eq(&self, other: &Self) -> bool {
        self.column_index == other.column_index
            && self.left_closed == other.left_closed
            && self.right_closed == other.right_closed
            && bound_bits(self.left) == bound_bits(other.left)
            && bound_bits(self.right) == bound_bits(other.right)
    }
}

impl Eq for ElementaryCondition {}

impl Hash for ElementaryCondition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.column_index.hash(state);
        bound_bits(self.left).hash(state);
        self.left_closed.hash(state);
        bound_bits(self.right).hash(state);
        self.right_closed.hash(state);
    }
}

impl Predicate for ElementaryCondition {
    fn _covered_mask(&self, x: &Dataset) -> Result<Vec<bool>> {
        Ok(x
            .column(self.column_index)?
            .iter()
            .map(|value| value.as_f64().is_some_and(|v| self._evaluate_some(v)))
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
        options: &FormatOptions,
    ) -> Result<String> {
        let name = column_name(columns_names, self.column_index)?;
        let one_sided = self.left == f64::NEG_INFINITY || self.right == f64::INFINITY;
        if options.concise_numerical_conditions && one_sided {
            return Ok(self.concise_string(name, negated, options));
        }
        let left_sign = if self.left_closed { "<" } else { "(" };
        let right_sign = if self.right_closed { ">" } else { ")" };
        Ok(format!(
            "{} {}= {}{}, {}{}",
            name,
            if negated { "!" } else { "" },
            left_sign,
            options.format_float(self.left),
            options.format_float(self.right),
            right_sign
        ))
    }
}
