#![allow(missing_docs)]

use std::collections::HashSet;

use poolgraph::storage::{EDGE_BASE_SIZE, VERTEX_BASE_SIZE};
use poolgraph::{Dir, GraphOptions, ListenableGraph, Pool, PoolObject, Record, RecordKind};
use proptest::prelude::*;

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

#[derive(Debug, Clone)]
enum PoolOp {
    Create,
    Delete(usize),
}

fn arb_pool_op() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        3 => Just(PoolOp::Create),
        2 => (0usize..64).prop_map(PoolOp::Delete),
    ]
}

#[derive(Debug, Clone)]
enum GraphOp {
    AddVertex,
    AddEdge(usize, usize),
    RemoveVertex(usize),
    RemoveEdge(usize),
    RemoveLinked(usize),
}

fn arb_graph_op() -> impl Strategy<Value = GraphOp> {
    prop_oneof![
        3 => Just(GraphOp::AddVertex),
        5 => (0usize..32, 0usize..32).prop_map(|(s, t)| GraphOp::AddEdge(s, t)),
        1 => (0usize..32).prop_map(GraphOp::RemoveVertex),
        2 => (0usize..64).prop_map(GraphOp::RemoveEdge),
        1 => (0usize..32).prop_map(GraphOp::RemoveLinked),
    ]
}

proptest! {
    #[test]
    fn prop_live_plus_free_equals_allocated(ops in prop::collection::vec(arb_pool_op(), 1..200)) {
        let mut pool = Pool::<Cell>::new(4).unwrap();
        let mut live: Vec<PoolObject<Cell>> = Vec::new();
        let mut freed: Vec<usize> = Vec::new();

        for op in ops {
            match op {
                PoolOp::Create => {
                    let allocated = pool.allocated_slots();
                    let mut obj = pool.create_ref();
                    pool.create(&mut obj).unwrap();
                    match freed.pop() {
                        Some(reused) => prop_assert_eq!(obj.index(), reused),
                        None => prop_assert_eq!(obj.index(), allocated),
                    }
                    pool.set_field(&obj, 0, obj.index() as u64);
                    live.push(obj);
                }
                PoolOp::Delete(pick) if !live.is_empty() => {
                    let obj = live.swap_remove(pick % live.len());
                    prop_assert!(pool.release(&obj));
                    prop_assert!(!pool.delete(obj.index()));
                    freed.push(obj.index());
                    pool.release_ref(obj);
                }
                PoolOp::Delete(_) => {}
            }

            prop_assert_eq!(pool.len() + pool.free_slots(), pool.allocated_slots());
            let live_set: HashSet<usize> = pool.indices().collect();
            prop_assert_eq!(live_set.len(), pool.len());
            for index in &freed {
                prop_assert!(!live_set.contains(index));
            }
            for obj in &live {
                prop_assert!(live_set.contains(&obj.index()));
                prop_assert_eq!(pool.get_field::<u64>(obj, 0), obj.index() as u64);
            }
        }
    }

    #[test]
    fn prop_graph_edges_always_join_live_vertices(ops in prop::collection::vec(arb_graph_op(), 1..150)) {
        let mut graph: ListenableGraph<Spot, Link> =
            ListenableGraph::new(GraphOptions::new().initial_vertex_capacity(2).initial_edge_capacity(2))
                .unwrap();
        let mut vertices: Vec<PoolObject<Spot>> = Vec::new();
        let mut edges: Vec<PoolObject<Link>> = Vec::new();

        for op in ops {
            match op {
                GraphOp::AddVertex => vertices.push(graph.add_vertex().unwrap()),
                GraphOp::AddEdge(s, t) if !vertices.is_empty() => {
                    let s = &vertices[s % vertices.len()];
                    let t = &vertices[t % vertices.len()];
                    edges.push(graph.add_edge(s, t).unwrap());
                }
                GraphOp::RemoveVertex(pick) if !vertices.is_empty() => {
                    let v = vertices.swap_remove(pick % vertices.len());
                    prop_assert!(graph.remove_vertex(&v));
                }
                GraphOp::RemoveEdge(pick) if !edges.is_empty() => {
                    let e = edges.swap_remove(pick % edges.len());
                    let was_live = graph.contains_edge(&e);
                    prop_assert_eq!(graph.remove_edge(&e), was_live);
                }
                GraphOp::RemoveLinked(pick) if !vertices.is_empty() => {
                    let v = &vertices[pick % vertices.len()];
                    let incident = graph.edges_of(v, Dir::Both).count();
                    prop_assert_eq!(graph.remove_all_linked_edges(v), incident);
                }
                _ => {}
            }
            edges.retain(|e| graph.contains_edge(e));

            prop_assert_eq!(graph.vertex_count(), vertices.len());
            prop_assert_eq!(graph.edge_count(), edges.len());
            let mut scratch = graph.vertex_ref();
            for edge in graph.edges() {
                prop_assert!(graph.contains_vertex(graph.edge_source(&edge, &mut scratch)));
                prop_assert!(graph.contains_vertex(graph.edge_target(&edge, &mut scratch)));
            }
            let out: usize = vertices.iter().map(|v| graph.edges_of(v, Dir::Out).count()).sum();
            let inc: usize = vertices.iter().map(|v| graph.edges_of(v, Dir::In).count()).sum();
            prop_assert_eq!(out, edges.len());
            prop_assert_eq!(inc, edges.len());
        }
    }

    #[test]
    fn prop_ref_to_swaps_bindings(a in 0usize..16, b in 0usize..16) {
        let mut pool = Pool::<Cell>::new(16).unwrap();
        for i in 0..16u64 {
            let mut obj = pool.create_ref();
            pool.create(&mut obj).unwrap();
            pool.set_field(&obj, 0, i);
            pool.release_ref(obj);
        }
        let mut x = pool.create_ref();
        let mut y = pool.create_ref();
        pool.get_by_index(a, &mut x);
        pool.get_by_index(b, &mut y);
        let allocated = pool.recycler().allocated();

        let mut tmp = pool.create_ref();
        tmp.ref_to(&x);
        x.ref_to(&y);
        y.ref_to(&tmp);
        pool.release_ref(tmp);

        prop_assert_eq!(x.index(), b);
        prop_assert_eq!(y.index(), a);
        prop_assert_eq!(pool.get_field::<u64>(&x, 0), b as u64);
        prop_assert_eq!(pool.get_field::<u64>(&y, 0), a as u64);
        prop_assert!(pool.recycler().allocated() <= allocated + 1);
    }
}
