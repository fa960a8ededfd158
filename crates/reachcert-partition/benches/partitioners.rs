//! Benchmarks for the global partitioning heuristics

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reachcert_partition::prelude::*;
use reachcert_partition::{FiducciaMattheyses, RandomPartitioner};

/// Random directed graph resembling a reached set: a spanning chain plus
/// random forward and back edges
fn generate_certificate_graph(n: usize, extra: usize, seed: u64) -> WeightedGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges: Vec<(usize, usize, u64)> = (0..n - 1).map(|i| (i, i + 1, 1)).collect();
    for _ in 0..extra {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        edges.push((u, v, 1));
    }
    WeightedGraph::from_edges(n, edges).unwrap()
}

fn bench_heuristics(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristics");
    let heuristics = [
        PartitioningHeuristic::Random,
        PartitioningHeuristic::BreadthFirst,
        PartitioningHeuristic::BestImprovementFirst,
        PartitioningHeuristic::FiducciaMattheyses,
        PartitioningHeuristic::Multilevel,
    ];

    for &n in &[1_000usize, 10_000] {
        let graph = generate_certificate_graph(n, n, 42);
        group.throughput(Throughput::Elements(n as u64));
        for heuristic in heuristics {
            let partitioner = build_partitioner(&PartitionerConfig::new(heuristic)).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{heuristic:?}"), n),
                &graph,
                |b, graph| b.iter(|| black_box(partitioner.compute_partitioning(8, graph).unwrap())),
            );
        }
    }
    group.finish();
}

fn bench_fm_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("fm");
    for &n in &[1_000usize, 5_000] {
        let graph = generate_certificate_graph(n, 2 * n, 7);
        let seed = RandomPartitioner::new(7).compute_partitioning(2, &graph).unwrap();
        group.bench_with_input(BenchmarkId::new("improve", n), &graph, |b, graph| {
            let fm = FiducciaMattheyses::new(graph, 1.1).unwrap();
            b.iter(|| {
                let mut p = seed.clone();
                black_box(fm.improve_partitioning(&mut p, 0, 1).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_heuristics, bench_fm_pass);
criterion_main!(benches);
