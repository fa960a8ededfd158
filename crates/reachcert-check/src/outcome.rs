//! Verdicts of a certificate check

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stats::CheckStatistics;

/// Why a certificate was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Rejection {
    /// The transfer relation or the coverage test failed
    Computation {
        /// Partition that failed, `None` in the global phase
        partition: Option<usize>,
        /// Error message of the analysis
        message: String,
    },
    /// Recomputation produced more states than the certificate holds
    Overflow {
        /// Partition that overflowed, `None` when only the union of all
        /// published certificates exceeds the bound
        partition: Option<usize>,
        /// Local certificate size plus states published by others
        states: usize,
        /// Size of the original certificate
        bound: usize,
    },
    /// A successor relied on for coverage is not covered by the certificate
    UncoveredObligation {
        /// Partition that raised the obligation, if known
        partition: Option<usize>,
        /// Debug rendering of the uncovered state
        state: String,
    },
    /// The analysis' initial state is not covered
    InitialStateNotCovered,
    /// The property checker rejected the certificate
    PropertyViolated,
    /// The check was stopped from outside
    Cancelled,
}

impl Rejection {
    /// Whether the rejection is a genuine soundness failure
    pub fn is_violation(&self) -> bool {
        !matches!(self, Rejection::Cancelled)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Computation { partition: Some(p), message } => {
                write!(f, "computation failed in partition {p}: {message}")
            }
            Rejection::Computation { partition: None, message } => {
                write!(f, "computation failed in the global phase: {message}")
            }
            Rejection::Overflow { partition: Some(p), states, bound } => write!(
                f,
                "partition {p} recomputed {states} states, certificate has {bound}"
            ),
            Rejection::Overflow { partition: None, states, bound } => write!(
                f,
                "partitions published {states} states, certificate has {bound}"
            ),
            Rejection::UncoveredObligation { partition: Some(p), state } => {
                write!(f, "state {state} required by partition {p} is not covered")
            }
            Rejection::UncoveredObligation { partition: None, state } => {
                write!(f, "state {state} is not covered")
            }
            Rejection::InitialStateNotCovered => write!(f, "initial state is not covered"),
            Rejection::PropertyViolated => write!(f, "property is violated"),
            Rejection::Cancelled => write!(f, "check was cancelled"),
        }
    }
}

/// Accept or reject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The certificate is closed and proves the property
    Accepted,
    /// The certificate could not be confirmed
    Rejected(Rejection),
}

/// Verdict plus statistics of a check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Final verdict
    pub verdict: Verdict,
    /// Work and timing statistics
    pub statistics: CheckStatistics,
}

impl CheckOutcome {
    /// Whether the certificate was accepted
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }

    /// The rejection, if any
    pub fn rejection(&self) -> Option<&Rejection> {
        match &self.verdict {
            Verdict::Accepted => None,
            Verdict::Rejected(rejection) => Some(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display() {
        let r = Rejection::Overflow { partition: Some(2), states: 11, bound: 10 };
        assert_eq!(r.to_string(), "partition 2 recomputed 11 states, certificate has 10");
        let r = Rejection::Overflow { partition: None, states: 9, bound: 8 };
        assert_eq!(r.to_string(), "partitions published 9 states, certificate has 8");
        assert_eq!(Rejection::Cancelled.to_string(), "check was cancelled");
        assert!(!Rejection::Cancelled.is_violation());
        assert!(Rejection::PropertyViolated.is_violation());
    }

    #[test]
    fn test_verdict_serializes() {
        let json = serde_json::to_string(&Verdict::Rejected(Rejection::InitialStateNotCovered)).unwrap();
        assert_eq!(json, r#"{"rejected":{"kind":"initial_state_not_covered"}}"#);
    }
}
