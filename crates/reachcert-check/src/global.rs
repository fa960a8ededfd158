//! Global phase: runs once every partition has published

use tracing::{debug, warn};

use crate::analysis::{Analysis, PropertyChecker};
use crate::index::{covered_by, LocationIndex};
use crate::outcome::Rejection;
use crate::shared::Aggregate;

/// Final soundness checks over the aggregated certificate
///
/// In order: the analysis' initial state is covered by the aggregated
/// certificate, every must-be-covered obligation is covered by the union of
/// the partitions' own states, and the property holds on the aggregated
/// states. States a partition added while recomputing never discharge an
/// obligation.
pub fn verify_global<A, P>(
    analysis: &A,
    property: &P,
    precision: &A::Precision,
    aggregate: &Aggregate<A::State, A::Location>,
) -> Result<(), Rejection>
where
    A: Analysis,
    P: PropertyChecker<A::State> + ?Sized,
{
    let states = &aggregate.certificate;
    let covered = |state: &A::State, index: &LocationIndex<A::Location>| {
        let candidates = index.at(&analysis.location(state));
        covered_by(analysis, precision, state, states, candidates).map_err(|err| {
            Rejection::Computation {
                partition: None,
                message: err.to_string(),
            }
        })
    };

    if !covered(&analysis.initial_state(), &aggregate.index)? {
        warn!("initial state is not covered by the certificate");
        return Err(Rejection::InitialStateNotCovered);
    }

    for obligation in &aggregate.must_be_covered {
        if !covered(obligation, &aggregate.own_index)? {
            warn!(state = ?obligation, "obligation is not covered");
            return Err(Rejection::UncoveredObligation {
                partition: None,
                state: format!("{obligation:?}"),
            });
        }
    }

    if !property.satisfies_property(states) {
        warn!(states = states.len(), "property is violated");
        return Err(Rejection::PropertyViolated);
    }

    debug!(
        states = states.len(),
        obligations = aggregate.must_be_covered.len(),
        "global phase passed"
    );
    Ok(())
}
