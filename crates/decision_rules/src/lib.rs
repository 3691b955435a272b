//! # Decision Rules
//!
//! Representation, evaluation and scoring of symbolic decision rules for
//! classification, regression and survival analysis.
//!
//! ## Key Features
//!
//! - **Condition trees**: nominal, interval, attribute-relation, discrete-set and
//!   compound conditions with negation, evaluated into per-row coverage masks
//! - **Quality measures**: pure functions of a rule's `(p, n, P, N)` coverage
//! - **Metrics**: per-rule metric tables for every supported task
//! - **Condition importances**: premise ablation aggregated over a rule set
//! - **Helpers**: condition coverage as binary columns, condition and attribute frequencies
//!
//! ## Example
//!
//! ```rust,ignore
//! use decision_rules::classification::{ClassificationConclusion, ClassificationRule, ClassificationRuleSet};
//! use decision_rules::conditions::Condition;
//! use decision_rules::dataset::Dataset;
//! use decision_rules::measures;
//!
//! let columns = vec!["age".to_string()];
//! let rule = ClassificationRule::new(
//!     Condition::elementary(0, 18.0, f64::INFINITY, true, false),
//!     ClassificationConclusion::new("adult", "label"),
//!     columns.clone(),
//! );
//! let mut ruleset = ClassificationRuleSet::new(vec![rule], columns);
//!
//! let x = Dataset::from_rows(vec![vec![12.0], vec![30.0]])?;
//! let y = vec!["child".into(), "adult".into()];
//! ruleset.update(&x, &y, measures::c2)?;
//! let predictions = ruleset.predict(&x)?; // ["child", "adult"]
//! ```

// Module declarations
pub mod classification;
pub mod conditions;
pub mod conf;
pub mod coverage;
pub mod dataframe;
pub mod dataset;
pub mod error;
pub mod helpers;
pub mod importances;
pub mod measures;
pub mod metrics;
pub mod regression;
pub mod rule;
pub mod stats;
pub mod survival;
