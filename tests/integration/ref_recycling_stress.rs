#![allow(missing_docs)]

use std::sync::{Arc, Barrier};
use std::thread;

use poolgraph::storage::{EDGE_BASE_SIZE, VERTEX_BASE_SIZE};
use poolgraph::{Dir, GraphOptions, ListenableGraph, Pool, Record, RecordKind};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const THREADS: usize = 4;
const ROUNDS: usize = 20_000;

struct Cell;

impl Record for Cell {
    const KIND: RecordKind = RecordKind::Plain;
    const SIZE_IN_BYTES: usize = 8;
}

struct Spot;
struct Link;

impl Record for Spot {
    const KIND: RecordKind = RecordKind::Vertex;
    const SIZE_IN_BYTES: usize = VERTEX_BASE_SIZE;
}

impl Record for Link {
    const KIND: RecordKind = RecordKind::Edge;
    const SIZE_IN_BYTES: usize = EDGE_BASE_SIZE;
}

#[test]
fn refs_recycle_across_threads() {
    let mut pool = Pool::<Cell>::new(16).unwrap();
    for i in 0..16u64 {
        let mut obj = pool.create_ref();
        pool.create(&mut obj).unwrap();
        pool.set_field(&obj, 0, i * 10);
        pool.release_ref(obj);
    }
    let pool = Arc::new(pool);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let pool = Arc::clone(&pool);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = ChaCha8Rng::seed_from_u64(t as u64);
                barrier.wait();
                for _ in 0..ROUNDS {
                    let mut held = Vec::new();
                    for _ in 0..rng.gen_range(1..4) {
                        let mut obj = pool.create_ref();
                        assert!(!obj.is_bound());
                        let index = rng.gen_range(0..16);
                        pool.get_by_index(index, &mut obj);
                        assert_eq!(pool.get_field::<u64>(&obj, 0), index as u64 * 10);
                        held.push(obj);
                    }
                    for obj in held {
                        pool.release_ref(obj);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let recycler = pool.recycler();
    assert!(recycler.allocated() <= THREADS * 3 + 1);
    assert_eq!(recycler.idle(), recycler.allocated());
}

#[test]
fn readers_traverse_while_writer_edits() {
    let graph: ListenableGraph<Spot, Link> = ListenableGraph::new(GraphOptions::default()).unwrap();
    let shared = graph.into_shared();
    let barrier = Arc::new(Barrier::new(THREADS + 1));

    let writer = {
        let shared = shared.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            barrier.wait();
            let mut spots = Vec::new();
            for _ in 0..2_000 {
                let mut graph = shared.write();
                if spots.len() < 2 || rng.gen_bool(0.4) {
                    spots.push(graph.add_vertex().unwrap());
                } else if rng.gen_bool(0.9) {
                    let s = &spots[rng.gen_range(0..spots.len())];
                    let t = &spots[rng.gen_range(0..spots.len())];
                    let edge = graph.add_edge(s, t).unwrap();
                    graph.release_edge_ref(edge);
                } else {
                    let v = spots.swap_remove(rng.gen_range(0..spots.len()));
                    assert!(graph.remove_vertex(&v));
                    graph.release_vertex_ref(v);
                }
            }
        })
    };

    let readers: Vec<_> = (0..THREADS)
        .map(|_| {
            let shared = shared.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    let graph = shared.read();
                    let out: usize = graph.vertices().map(|v| graph.edges_of(&v, Dir::Out).count()).sum();
                    assert_eq!(out, graph.edge_count());
                    // Borrowing refs needs no write lock.
                    let scratch = graph.vertex_ref();
                    graph.release_vertex_ref(scratch);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(shared.handle_count(), 1);
}
