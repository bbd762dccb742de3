//! Timing harness for the pooled graph.
//!
//! Builds a seeded random graph, then measures vertex and edge creation,
//! incidence traversal, cascading vertex removal, and concurrent ref
//! recycling.

use std::error::Error;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use poolgraph::storage::{CounterMetrics, EDGE_BASE_SIZE, VERTEX_BASE_SIZE};
use poolgraph::{Dir, GraphOptions, ListenableGraph, PoolObject, Record, RecordKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct BenchVertex;
struct BenchEdge;

const LABEL_OFFSET: usize = VERTEX_BASE_SIZE;
const WEIGHT_OFFSET: usize = EDGE_BASE_SIZE;

impl Record for BenchVertex {
    const KIND: RecordKind = RecordKind::Vertex;
    const SIZE_IN_BYTES: usize = VERTEX_BASE_SIZE + 8;
}

impl Record for BenchEdge {
    const KIND: RecordKind = RecordKind::Edge;
    const SIZE_IN_BYTES: usize = EDGE_BASE_SIZE + 8;
}

type BenchGraph = ListenableGraph<BenchVertex, BenchEdge>;

#[derive(Parser, Debug)]
#[command(name = "pool-bench", about = "Timing harness for the pooled graph")]
struct Args {
    /// Number of vertices to create.
    #[arg(long, env = "POOL_BENCH_VERTICES", default_value_t = 100_000)]
    vertices: usize,

    /// Average number of outgoing edges per vertex.
    #[arg(long, env = "POOL_BENCH_DEGREE", default_value_t = 4)]
    degree: usize,

    /// Fraction of vertices removed in the delete phase.
    #[arg(long, default_value_t = 0.1)]
    remove_fraction: f64,

    /// Threads borrowing and returning refs in the recycle phase.
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Ref borrow/return pairs per thread in the recycle phase.
    #[arg(long, default_value_t = 1_000_000)]
    recycle_ops: usize,

    /// RNG seed for repeatable graphs.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print results as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct BenchResult {
    name: &'static str,
    ops: usize,
    #[serde(serialize_with = "micros")]
    time: Duration,
}

fn micros<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_micros())
}

impl BenchResult {
    fn print_header() {
        println!("{:<20} {:>12} {:>15} {:>12}", "BENCHMARK", "OPS", "TIME", "NS/OP");
    }

    fn print(&self) {
        let per_op = if self.ops == 0 {
            0.0
        } else {
            self.time.as_nanos() as f64 / self.ops as f64
        };
        println!(
            "{:<20} {:>12} {:>15} {:>12.1}",
            self.name,
            self.ops,
            format_duration(self.time),
            per_op
        );
    }
}

fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1_000 {
        format!("{} µs", micros)
    } else if micros < 1_000_000 {
        format!("{:.2} ms", micros as f64 / 1_000.0)
    } else {
        format!("{:.2} s", micros as f64 / 1_000_000.0)
    }
}

/// Runs `f` once and times it. `f` reports how many operations it did.
fn bench<T>(
    name: &'static str,
    f: impl FnOnce() -> poolgraph::Result<(usize, T)>,
) -> poolgraph::Result<(BenchResult, T)> {
    let start = Instant::now();
    let (ops, value) = f()?;
    let time = start.elapsed();
    Ok((BenchResult { name, ops, time }, value))
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(err) = try_main() {
        eprintln!("pool-bench failed: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.remove_fraction) {
        return Err("--remove-fraction must lie in [0, 1]".into());
    }
    info!(?args, "starting pool-bench");

    let metrics = Arc::new(CounterMetrics::default());
    let mut graph: BenchGraph = ListenableGraph::new(
        GraphOptions::new()
            .initial_vertex_capacity(args.vertices)
            .initial_edge_capacity(args.vertices.saturating_mul(args.degree))
            .metrics(metrics.clone()),
    )?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut results = Vec::new();

    let (result, vertices) = bench("add_vertex", || {
        let mut vertices = Vec::with_capacity(args.vertices);
        for label in 0..args.vertices {
            let vertex = graph.add_vertex()?;
            graph.set_vertex_field(&vertex, LABEL_OFFSET, label as u64);
            vertices.push(vertex);
        }
        Ok((vertices.len(), vertices))
    })?;
    results.push(result);

    let edge_count = if vertices.is_empty() {
        0
    } else {
        args.vertices * args.degree
    };
    let (result, ()) = bench("add_edge", || {
        let mut edge = graph.edge_ref();
        for _ in 0..edge_count {
            let source = &vertices[rng.gen_range(0..vertices.len())];
            let target = &vertices[rng.gen_range(0..vertices.len())];
            graph.add_edge_into(source, target, &mut edge)?;
            graph.set_edge_field(&edge, WEIGHT_OFFSET, rng.gen::<f64>());
        }
        graph.release_edge_ref(edge);
        Ok((edge_count, ()))
    })?;
    results.push(result);

    let (result, weight) = bench("traverse", || {
        let mut visited = 0;
        let mut weight = 0.0f64;
        for vertex in graph.vertices() {
            for edge in graph.edges_of(&vertex, Dir::Out) {
                weight += graph.edge_field::<f64>(&edge, WEIGHT_OFFSET);
                visited += 1;
            }
        }
        Ok((visited, weight))
    })?;
    results.push(result);
    info!(weight, "traversal checksum");

    let doomed = (vertices.len() as f64 * args.remove_fraction) as usize;
    let (result, ()) = bench("remove_vertex", || {
        let mut removed = 0;
        for vertex in vertices.iter().take(doomed) {
            if graph.remove_vertex(vertex) {
                removed += 1;
            }
        }
        Ok((removed, ()))
    })?;
    results.push(result);

    let (result, ()) = bench("recycle_refs", || Ok((recycle(&graph, &args), ())))?;
    results.push(result);

    for vertex in vertices {
        graph.release_vertex_ref(vertex);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        BenchResult::print_header();
        for result in &results {
            result.print();
        }
        println!(
            "\nlive: {} vertices, {} edges (counters: {} / {})",
            graph.vertex_count(),
            graph.edge_count(),
            metrics.live_vertices(),
            metrics.live_edges()
        );
    }
    Ok(())
}

/// Borrows and returns refs from several threads at once. Refs need no
/// graph lock, so the graph is shared read-only.
fn recycle(graph: &BenchGraph, args: &Args) -> usize {
    let threads = args.threads.max(1);
    let barrier = Barrier::new(threads);
    thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                barrier.wait();
                for _ in 0..args.recycle_ops {
                    let vertex: PoolObject<BenchVertex> = graph.vertex_ref();
                    graph.release_vertex_ref(vertex);
                }
            });
        }
    });
    info!(
        allocated = graph.vertex_store().recycler().allocated(),
        recycled = graph.vertex_store().recycler().recycled(),
        "ref recycling finished"
    );
    threads * args.recycle_ops
}
