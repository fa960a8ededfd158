//! Command implementations
//!
//! Every command returns `Ok(true)` on success, `Ok(false)` when the
//! certificate was rejected, and `Err` for unusable input.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use reachcert_check::interval::{IntervalAnalysis, IntervalProgram, IntervalProperty, IntervalState};
use reachcert_check::{
    CertificateChecker, CheckOutcome, CheckStrategy, CheckerConfig, PartitionLayout, ReachedSet,
};
use reachcert_partition::PartitioningHeuristic;
use tracing::info;

use super::format::{format_outcome, format_success};
use crate::StrategyArg;

/// Partitioning heuristic on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum HeuristicArg {
    /// Uniformly random balanced assignment
    Random,
    /// Grow partitions along a breadth-first traversal
    BreadthFirst,
    /// Grow partitions along a depth-first traversal
    DepthFirst,
    /// Grow partitions from a priority frontier with the configured evaluation
    BestFirst,
    /// Priority frontier preferring nodes with little weight outside the partition
    BestImprovementFirst,
    /// Exhaustive search for the smallest cut, tiny certificates only
    Optimal,
    /// Seed partitioning refined by Fiduccia-Mattheyses passes
    Fm,
    /// Coarsen by matching, partition, then refine while uncoarsening
    Multilevel,
}

impl From<HeuristicArg> for PartitioningHeuristic {
    fn from(arg: HeuristicArg) -> Self {
        match arg {
            HeuristicArg::Random => PartitioningHeuristic::Random,
            HeuristicArg::BreadthFirst => PartitioningHeuristic::BreadthFirst,
            HeuristicArg::DepthFirst => PartitioningHeuristic::DepthFirst,
            HeuristicArg::BestFirst => PartitioningHeuristic::BestFirst,
            HeuristicArg::BestImprovementFirst => PartitioningHeuristic::BestImprovementFirst,
            HeuristicArg::Optimal => PartitioningHeuristic::Optimal,
            HeuristicArg::Fm => PartitioningHeuristic::FiducciaMattheyses,
            HeuristicArg::Multilevel => PartitioningHeuristic::Multilevel,
        }
    }
}

impl From<StrategyArg> for CheckStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Partitioned => CheckStrategy::Partitioned,
            StrategyArg::ReachedSet => CheckStrategy::ReachedSet,
        }
    }
}

/// Flags applied on top of the configuration file
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Worker threads
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Maximum states per partition
    #[arg(short, long)]
    pub max_elements: Option<usize>,

    /// Partitioning heuristic
    #[arg(long, value_enum)]
    pub heuristic: Option<HeuristicArg>,

    /// Random seed for the partitioner
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Inputs shared by `check` and `verify`
pub struct CheckArgs {
    pub program: PathBuf,
    pub input: PathBuf,
    pub json: bool,
}

type IntervalChecker = CertificateChecker<IntervalAnalysis, IntervalProperty>;

/// Load the configuration file, if any, and apply the overrides
fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<CheckerConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => CheckerConfig::default(),
    };

    if let Some(threads) = overrides.threads {
        config.threads = threads;
    }
    if let Some(max) = overrides.max_elements {
        config.max_elements_per_partition = max;
    }
    if let Some(heuristic) = overrides.heuristic {
        config.partitioner.heuristic = heuristic.into();
    }
    if let Some(seed) = overrides.seed {
        config.partitioner.seed = seed;
    }
    Ok(config)
}

fn load_program(path: &Path) -> Result<IntervalProgram> {
    IntervalProgram::from_path(path).with_context(|| format!("Failed to load program {}", path.display()))
}

fn load_certificate(path: &Path) -> Result<ReachedSet<IntervalState>> {
    let file = File::open(path).with_context(|| format!("Failed to open certificate {}", path.display()))?;
    let reached: ReachedSet<IntervalState> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse certificate {}", path.display()))?;
    Ok(reached.validated()?)
}

fn build_checker(program: &IntervalProgram, config: CheckerConfig) -> Result<IntervalChecker> {
    CertificateChecker::new(program.analysis(), program.property(), config)
        .context("Invalid checker configuration")
}

fn report(outcome: &CheckOutcome, json: bool) -> Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        print!("{}", format_outcome(outcome));
    }
    Ok(outcome.is_accepted())
}

/// Explore a program into a certificate file
pub fn explore(program: &Path, output: &Path, max_states: usize) -> Result<bool> {
    let program = load_program(program)?;
    let reached = ReachedSet::explore(&program.analysis(), max_states)?;

    let file = File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &reached)?;
    writer.flush()?;
    info!(states = reached.len(), output = %output.display(), "certificate written");

    println!(
        "{}",
        format_success(&format!(
            "Certificate with {} states and {} edges written to {}",
            reached.len(),
            reached.edges().len(),
            output.display()
        ))
    );
    Ok(true)
}

/// Partition a certificate into a layout file
pub fn partition(
    program: &Path,
    certificate: &Path,
    output: &Path,
    config: Option<&Path>,
    overrides: &Overrides,
) -> Result<bool> {
    let program = load_program(program)?;
    let reached = load_certificate(certificate)?;
    let checker = build_checker(&program, load_config(config, overrides)?)?;

    let partitioning = checker.partition(&reached)?;
    let cut = partitioning.cut_size(&reached.to_weighted_graph()?);
    let layout = PartitionLayout::compute(&reached, &partitioning)?;
    let file = File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    layout.write_to(BufWriter::new(file))?;

    println!(
        "{}",
        format_success(&format!(
            "{} partitions (cut {}) written to {}",
            layout.partition_count(),
            cut,
            output.display()
        ))
    );
    Ok(true)
}

/// Check a certificate file
pub fn check(
    args: &CheckArgs,
    strategy: Option<StrategyArg>,
    config: Option<&Path>,
    overrides: &Overrides,
) -> Result<bool> {
    let program = load_program(&args.program)?;
    let reached = load_certificate(&args.input)?;
    let mut config = load_config(config, overrides)?;
    if let Some(strategy) = strategy {
        config.strategy = strategy.into();
    }

    let outcome = build_checker(&program, config)?.check_certificate(&reached)?;
    report(&outcome, args.json)
}

/// Check a layout file
pub fn verify(args: &CheckArgs, config: Option<&Path>, overrides: &Overrides) -> Result<bool> {
    let program = load_program(&args.program)?;
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open layout {}", args.input.display()))?;
    let layout: PartitionLayout<IntervalState> = PartitionLayout::read_from(BufReader::new(file))
        .with_context(|| format!("Failed to read layout {}", args.input.display()))?;

    let checker = build_checker(&program, load_config(config, overrides)?)?;
    let outcome = checker.check_layout(Arc::new(layout))?;
    report(&outcome, args.json)
}
