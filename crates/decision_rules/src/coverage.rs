//! Rule coverage: the (p, n, P, N) confusion-style summary of a rule.

use crate::error::{DecisionRulesError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule coverage.
///
/// * `p` - positive examples covered by the rule
/// * `n` - negative examples covered by the rule
/// * `P` - all positive examples
/// * `N` - all negative examples
///
/// Any count may be unknown (e.g. a rule restored without its training
/// statistics); unknown counts skip validation and make measures return NaN.
#[allow(non_snake_case)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coverage {
    p: Option<usize>,
    n: Option<usize>,
    P: Option<usize>,
    N: Option<usize>,
}

#[allow(non_snake_case)]
impl Coverage {
    pub fn new(p: usize, n: usize, P: usize, N: usize) -> Result<Self> {
        Self::partial(Some(p), Some(n), Some(P), Some(N))
    }

    pub fn partial(
        p: Option<usize>,
        n: Option<usize>,
        P: Option<usize>,
        N: Option<usize>,
    ) -> Result<Self> {
        let coverage = Self { p, n, P, N };
        coverage.validate()?;
        Ok(coverage)
    }

    /// Coverage with every count unknown.
    pub fn unknown() -> Self {
        Self {
            p: None,
            n: None,
            P: None,
            N: None,
        }
    }

    fn validate(&self) -> Result<()> {
        let (Some(p), Some(n), Some(P), Some(N)) = self.as_tuple() else {
            return Ok(());
        };
        if p > P {
            return Err(DecisionRulesError::InvalidCoverage(
                "p is greater than P".to_string(),
            ));
        }
        if n > N {
            return Err(DecisionRulesError::InvalidCoverage(
                "n is greater than N".to_string(),
            ));
        }
        Ok(())
    }

    pub fn p(&self) -> Option<usize> {
        self.p
    }

    pub fn n(&self) -> Option<usize> {
        self.n
    }

    pub fn P(&self) -> Option<usize> {
        self.P
    }

    pub fn N(&self) -> Option<usize> {
        self.N
    }

    /// Copy with new totals, e.g. when the training distribution becomes known.
    pub fn with_totals(&self, P: usize, N: usize) -> Result<Self> {
        Self::partial(self.p, self.n, Some(P), Some(N))
    }

    pub fn is_complete(&self) -> bool {
        self.p.is_some() && self.n.is_some() && self.P.is_some() && self.N.is_some()
    }

    pub fn as_tuple(&self) -> (Option<usize>, Option<usize>, Option<usize>, Option<usize>) {
        (self.p, self.n, self.P, self.N)
    }

    /// Counts as floats, NaN for unknown fields.
    pub fn as_f64(&self) -> (f64, f64, f64, f64) {
        let f = |v: Option<usize>| v.map_or(f64::NAN, |v| v as f64);
        (f(self.p), f(self.n), f(self.P), f(self.N))
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<usize>| v.map_or_else(|| "None".to_string(), |v| v.to_string());
        write!(
            f,
            "(p={}, n={}, P={}, N={})",
            show(self.p),
            show(self.n),
            show(self.P),
            show(self.N)
        )
    }
}
