//! Parallel checking strategies

use crate::outcome::Rejection;
use crate::shared::Aggregate;

pub(crate) mod partitioned;
pub(crate) mod reached_set;

/// Outcome of the parallel phase: the aggregate for the global phase, or the
/// rejection that stopped it
pub(crate) type PhaseResult<S, L> = std::result::Result<Aggregate<S, L>, Rejection>;
