//! Logical conditions forming rule premises.
//!
//! A [`Condition`] is a negation flag plus one [`ConditionKind`] variant. Every
//! variant implements [`Predicate`], which computes the raw coverage mask; the
//! negation flag is applied on top of it by [`Condition::covered_mask`].
//!
//! Equality and hashing are structural so conditions can be used as keys when
//! the same condition appears in several rules.

mod compound;
mod elementary;
mod nominal;
mod relation;

pub use compound::{CompoundCondition, LogicOperator};
pub use elementary::ElementaryCondition;
pub use nominal::{DiscreteSetCondition, NominalAttributesEqualityCondition, NominalCondition};
pub use relation::{AttributesRelationCondition, Relation};

use crate::conf::FormatOptions;
use crate::dataset::Dataset;
use crate::error::{DecisionRulesError, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

/// Per-variant capabilities. Implementations ignore negation.
pub trait Predicate {
    /// Raw coverage mask, one entry per dataset row.
    fn _covered_mask(&self, x: &Dataset) -> Result<Vec<bool>>;

    /// Column indices referenced by the predicate.
    fn attributes(&self) -> BTreeSet<usize>;

    fn update_column_indices(&mut self, mapping: &HashMap<usize, usize>) -> Result<()>;

    fn to_string(
        &self,
        negated: bool,
        columns_names: &[String],
        options: &FormatOptions,
    ) -> Result<String>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConditionKind {
    Nominal(NominalCondition),
    Elementary(ElementaryCondition),
    AttributesRelation(AttributesRelationCondition),
    NominalAttributesEquality(NominalAttributesEqualityCondition),
    DiscreteSet(DiscreteSetCondition),
    Compound(CompoundCondition),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Condition {
    pub negated: bool,
    pub kind: ConditionKind,
}

impl Condition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            negated: false,
            kind,
        }
    }

    pub fn nominal(column_index: usize, value: impl Into<String>) -> Self {
        Self::new(ConditionKind::Nominal(NominalCondition::new(
            column_index,
            value,
        )))
    }

    pub fn elementary(
        column_index: usize,
        left: f64,
        right: f64,
        left_closed: bool,
        right_closed: bool,
    ) -> Self {
        Self::new(ConditionKind::Elementary(ElementaryCondition::new(
            column_index,
            left,
            right,
            left_closed,
            right_closed,
        )))
    }

    pub fn attributes_relation(column_left: usize, column_right: usize, operator: &str) -> Result<Self> {
        Ok(Self::new(ConditionKind::AttributesRelation(
            AttributesRelationCondition::new(column_left, column_right, operator)?,
        )))
    }

    pub fn nominal_attributes_equality(column_indices: Vec<usize>) -> Self {
        Self::new(ConditionKind::NominalAttributesEquality(
            NominalAttributesEqualityCondition::new(column_indices),
        ))
    }

    pub fn discrete_set<I, S>(column_index: usize, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ConditionKind::DiscreteSet(DiscreteSetCondition::new(
            column_index,
            values,
        )))
    }

    pub fn compound(subconditions: Vec<Condition>, logic_operator: LogicOperator) -> Self {
        Self::new(ConditionKind::Compound(CompoundCondition::new(
            subconditions,
            logic_operator,
        )))
    }

    /// Conjunction of `subconditions`.
    pub fn and(subconditions: Vec<Condition>) -> Self {
        Self::compound(subconditions, LogicOperator::Conjunction)
    }

    /// Alternative of `subconditions`.
    pub fn or(subconditions: Vec<Condition>) -> Self {
        Self::compound(subconditions, LogicOperator::Alternative)
    }

    /// Toggle negation.
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    fn predicate(&self) -> &dyn Predicate {
        match &self.kind {
            ConditionKind::Nominal(c) => c,
            ConditionKind::Elementary(c) => c,
            ConditionKind::AttributesRelation(c) => c,
            ConditionKind::NominalAttributesEquality(c) => c,
            ConditionKind::DiscreteSet(c) => c,
            ConditionKind::Compound(c) => c,
        }
    }

    fn predicate_mut(&mut self) -> &mut dyn Predicate {
        match &mut self.kind {
            ConditionKind::Nominal(c) => c,
            ConditionKind::Elementary(c) => c,
            ConditionKind::AttributesRelation(c) => c,
            ConditionKind::NominalAttributesEquality(c) => c,
            ConditionKind::DiscreteSet(c) => c,
            ConditionKind::Compound(c) => c,
        }
    }

    /// Boolean mask of rows covered by the condition, negation applied.
    pub fn covered_mask(&self, x: &Dataset) -> Result<Vec<bool>> {
        let mut mask = self.predicate()._covered_mask(x)?;
        if mask.len() != x.n_rows() {
            return Err(DecisionRulesError::ShapeMismatch(format!(
                "condition mask has {} entries for {} rows",
                mask.len(),
                x.n_rows()
            )));
        }
        if self.negated {
            mask.iter_mut().for_each(|covered| *covered = !*covered);
        }
        Ok(mask)
    }

    pub fn attributes(&self) -> BTreeSet<usize> {
        self.predicate().attributes()
    }

    /// Remap every referenced column index through `mapping` (old index -> new index).
    pub fn update_column_indices(&mut self, mapping: &HashMap<usize, usize>) -> Result<()> {
        self.predicate_mut().update_column_indices(mapping)
    }

    pub fn to_string(&self, columns_names: &[String]) -> Result<String> {
        self.to_string_with(columns_names, &FormatOptions::default())
    }

    pub fn to_string_with(&self, columns_names: &[String], options: &FormatOptions) -> Result<String> {
        self.predicate()
            .to_string(self.negated, columns_names, options)
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.kind, ConditionKind::Compound(_))
    }

    pub fn as_compound(&self) -> Option<&CompoundCondition> {
        match &self.kind {
            ConditionKind::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Direct children of a compound condition, empty for atomic conditions.
    pub fn subconditions(&self) -> &[Condition] {
        match &self.kind {
            ConditionKind::Compound(c) => &c.subconditions,
            _ => &[],
        }
    }

    /// Number of atomic leaves below this condition.
    pub fn conditions_count(&self) -> usize {
        match &self.kind {
            ConditionKind::Compound(c) => c.subconditions.iter().map(Self::conditions_count).sum(),
            _ => 1,
        }
    }

    /// Atomic leaves reachable from this condition, structurally equal leaves
    /// reported once, in order of first appearance.
    pub fn atomic_conditions(&self) -> Vec<&Condition> {
        let mut out: Vec<&Condition> = Vec::new();
        self.collect_atomic(&mut out);
        out
    }

    fn collect_atomic<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        match &self.kind {
            ConditionKind::Compound(c) => {
                for sub in &c.subconditions {
                    sub.collect_atomic(out);
                }
            }
            _ => {
                if !out.contains(&self) {
                    out.push(self);
                }
            }
        }
    }

    /// Copy of this condition with every occurrence of `condition` removed at
    /// any depth. Returns `None` when this condition itself is removed.
    /// Nested compounds left without children are dropped from their parent,
    /// the top-level compound is kept even when it ends up empty.
    pub fn remove_condition_recursively(&self, condition: &Condition) -> Option<Condition> {
        if self == condition {
            return None;
        }
        match &self.kind {
            ConditionKind::Compound(c) => {
                let subconditions: Vec<Condition> = c
                    .subconditions
                    .iter()
                    .filter_map(|sub| {
                        let kept = sub.remove_condition_recursively(condition)?;
                        let emptied = kept.is_compound()
                            && kept.subconditions().is_empty()
                            && !sub.subconditions().is_empty();
                        (!emptied).then_some(kept)
                    })
                    .collect();
                Some(Condition {
                    negated: self.negated,
                    kind: ConditionKind::Compound(CompoundCondition::new(
                        subconditions,
                        c.logic_operator,
                    )),
                })
            }
            _ => Some(self.clone()),
        }
    }

    fn structural_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        if self.negated != other.negated {
            return false;
        }
        match (&self.kind, &other.kind) {
            (ConditionKind::Nominal(a), ConditionKind::Nominal(b)) => a == b,
            (ConditionKind::Elementary(a), ConditionKind::Elementary(b)) => a == b,
            (ConditionKind::AttributesRelation(a), ConditionKind::AttributesRelation(b)) => a == b,
            (
                ConditionKind::NominalAttributesEquality(a),
                ConditionKind::NominalAttributesEquality(b),
            ) => a == b,
            (ConditionKind::DiscreteSet(a), ConditionKind::DiscreteSet(b)) => a == b,
            (ConditionKind::Compound(a), ConditionKind::Compound(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Condition {}

impl Hash for Condition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.negated.hash(state);
        std::mem::discriminant(&self.kind).hash(state);
        match &self.kind {
            ConditionKind::Nominal(c) => c.hash(state),
            ConditionKind::Elementary(c) => c.hash(state),
            ConditionKind::AttributesRelation(c) => c.hash(state),
            ConditionKind::NominalAttributesEquality(c) => c.hash(state),
            ConditionKind::DiscreteSet(c) => c.hash(state),
            ConditionKind::Compound(c) => {
                c.logic_operator.hash(state);
                // order independent: hash the sorted set of child hashes
                let mut child_hashes: Vec<u64> =
                    c.subconditions.iter().map(Self::structural_hash).collect();
                child_hashes.sort_unstable();
                child_hashes.dedup();
                child_hashes.hash(state);
            }
        }
    }
}

/// Column name lookup shared by the `to_string` implementations.
pub(crate) fn column_name(columns_names: &[String], index: usize) -> Result<&str> {
    columns_names
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| DecisionRulesError::AttributeNotFound(format!("column #{index}")))
}

/// Remap a single column index.
pub(crate) fn remap_index(mapping: &HashMap<usize, usize>, index: usize) -> Result<usize> {
    mapping
        .get(&index)
        .copied()
        .ok_or_else(|| DecisionRulesError::AttributeNotFound(format!("column #{index}")))
}
