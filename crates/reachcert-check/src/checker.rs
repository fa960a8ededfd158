//! Entry point tying partitioning, the parallel phase and the global phase

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use reachcert_partition::{build_partitioner, Partitioning};
use tracing::{debug, info, warn};

use crate::analysis::{Analysis, PropertyChecker};
use crate::config::{CheckStrategy, CheckerConfig};
use crate::error::Result;
use crate::global::verify_global;
use crate::layout::PartitionLayout;
use crate::outcome::{CheckOutcome, Verdict};
use crate::reached::ReachedSet;
use crate::shared::ShutdownNotifier;
use crate::stats::CheckStatistics;
use crate::strategy::{partitioned, reached_set, PhaseResult};

/// Re-validates reachability certificates in parallel
///
/// # Example
///
/// ```
/// use reachcert_check::prelude::*;
/// use reachcert_check::interval::{Interval, IntervalProgram, Transition};
///
/// let program = IntervalProgram {
///     initial_location: 0,
///     initial_value: Interval::point(0),
///     transitions: vec![Transition { from: 0, to: 0, guard: Interval::new(0, 4), delta: 1 }],
///     error_locations: [9].into(),
/// };
/// let analysis = program.analysis();
/// let reached = ReachedSet::explore(&analysis, 100).unwrap();
///
/// let config = CheckerConfig::new().threads(2).max_elements_per_partition(2);
/// let checker = CertificateChecker::new(analysis, program.property(), config).unwrap();
/// assert!(checker.check_certificate(&reached).unwrap().is_accepted());
/// ```
pub struct CertificateChecker<A, P> {
    analysis: Arc<A>,
    property: Arc<P>,
    config: CheckerConfig,
    shutdown: ShutdownNotifier,
}

impl<A, P> CertificateChecker<A, P>
where
    A: Analysis + 'static,
    P: PropertyChecker<A::State>,
{
    /// Create a checker
    ///
    /// # Errors
    ///
    /// A configuration error if `config` does not validate.
    pub fn new(analysis: A, property: P, config: CheckerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            analysis: Arc::new(analysis),
            property: Arc::new(property),
            config,
            shutdown: ShutdownNotifier::new(),
        })
    }

    /// The active configuration
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// The analysis replayed by every check
    pub fn analysis(&self) -> &A {
        &self.analysis
    }

    /// Handle for stopping running and future checks
    ///
    /// A requested shutdown is permanent: every later check is cancelled.
    pub fn shutdown_notifier(&self) -> ShutdownNotifier {
        self.shutdown.clone()
    }

    /// Partition a certificate's dependency graph
    pub fn partition(&self, reached: &ReachedSet<A::State>) -> Result<Partitioning> {
        let graph = reached.to_weighted_graph()?;
        let k = self.config.partition_count(reached.len());
        let partitioner = build_partitioner(&self.config.partitioner)?;
        let partitioning = partitioner.compute_partitioning(k, &graph)?;
        debug!(
            partitioner = partitioner.name(),
            k,
            partitions = partitioning.len(),
            cut = partitioning.cut_size(&graph),
            "partitioned certificate"
        );
        Ok(partitioning)
    }

    /// Partition a certificate and persist it for a later check
    pub fn write_certificate<W: Write>(&self, reached: &ReachedSet<A::State>, writer: W) -> Result<()> {
        let partitioning = self.partition(reached)?;
        PartitionLayout::compute(reached, &partitioning)?.write_to(writer)
    }

    /// Check a certificate with the configured strategy
    pub fn check_certificate(&self, reached: &ReachedSet<A::State>) -> Result<CheckOutcome> {
        let mut statistics = CheckStatistics {
            certificate_states: reached.len(),
            ..CheckStatistics::default()
        };
        let shutdown = self.shutdown.child();

        let phase = match self.config.strategy {
            CheckStrategy::Partitioned => {
                let started = Instant::now();
                let partitioning = self.partition(reached)?;
                let layout = Arc::new(PartitionLayout::compute(reached, &partitioning)?);
                statistics.partitioning_time = started.elapsed();
                statistics.partitions = layout.partition_count();
                statistics.threads = self.config.threads.min(layout.partition_count()).max(1);

                let started = Instant::now();
                let phase = partitioned::run(
                    Arc::clone(&self.analysis),
                    layout,
                    self.config.threads,
                    &shutdown,
                )?;
                statistics.checking_time = started.elapsed();
                phase
            }
            CheckStrategy::ReachedSet => {
                statistics.partitions = 1;
                statistics.threads = self.config.threads.min(reached.len()).max(1);

                let started = Instant::now();
                let phase = reached_set::run(
                    self.analysis.as_ref(),
                    reached,
                    self.config.threads,
                    self.config.load_distribution,
                    &shutdown,
                );
                statistics.checking_time = started.elapsed();
                phase
            }
        };
        Ok(self.finish(phase, statistics))
    }

    /// Check an already partitioned certificate
    ///
    /// Always uses the partitioned strategy.
    pub fn check_layout(&self, layout: Arc<PartitionLayout<A::State>>) -> Result<CheckOutcome> {
        let mut statistics = CheckStatistics {
            certificate_states: layout.total_state_count,
            partitions: layout.partition_count(),
            threads: self.config.threads.min(layout.partition_count()).max(1),
            ..CheckStatistics::default()
        };
        let shutdown = self.shutdown.child();

        let started = Instant::now();
        let phase = partitioned::run(Arc::clone(&self.analysis), layout, self.config.threads, &shutdown)?;
        statistics.checking_time = started.elapsed();
        Ok(self.finish(phase, statistics))
    }

    fn finish(
        &self,
        phase: PhaseResult<A::State, A::Location>,
        mut statistics: CheckStatistics,
    ) -> CheckOutcome {
        let verdict = match phase {
            Err(rejection) => Verdict::Rejected(rejection),
            Ok(aggregate) => {
                statistics.added_states = aggregate.added_states;
                statistics.successor_computations = aggregate.successor_computations;
                statistics.obligations = aggregate.must_be_covered.len();

                let started = Instant::now();
                let precision = self.analysis.initial_precision();
                let global = verify_global(
                    self.analysis.as_ref(),
                    self.property.as_ref(),
                    &precision,
                    &aggregate,
                );
                statistics.global_time = started.elapsed();
                match global {
                    Ok(()) => Verdict::Accepted,
                    Err(rejection) => Verdict::Rejected(rejection),
                }
            }
        };

        match &verdict {
            Verdict::Accepted => info!(
                states = statistics.certificate_states,
                partitions = statistics.partitions,
                elapsed_ms = statistics.total_time().as_millis() as u64,
                "certificate accepted"
            ),
            Verdict::Rejected(rejection) if rejection.is_violation() => {
                warn!(%rejection, "certificate rejected")
            }
            Verdict::Rejected(_) => info!("certificate check cancelled"),
        }
        CheckOutcome { verdict, statistics }
    }
}
