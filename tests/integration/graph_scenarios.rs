#![allow(missing_docs)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use poolgraph::storage::{EDGE_BASE_SIZE, VERTEX_BASE_SIZE};
use poolgraph::{
    Dir, GraphListener, GraphOptions, IdBimap, ListenableGraph, PoolObject, Record, RecordKind,
    Result,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const SEED: u64 = 0x5eed_cafe;
const ID_OFFSET: usize = VERTEX_BASE_SIZE;

struct Spot;
struct Link;

impl Record for Spot {
    const KIND: RecordKind = RecordKind::Vertex;
    const SIZE_IN_BYTES: usize = VERTEX_BASE_SIZE + 4;
}

impl Record for Link {
    const KIND: RecordKind = RecordKind::Edge;
    const SIZE_IN_BYTES: usize = EDGE_BASE_SIZE;
}

type Graph = ListenableGraph<Spot, Link>;

#[derive(Default)]
struct Tally {
    rebuilt: AtomicUsize,
    per_edit: AtomicUsize,
}

impl Tally {
    fn calls(&self) -> usize {
        self.rebuilt.load(Ordering::Relaxed) + self.per_edit.load(Ordering::Relaxed)
    }
}

impl GraphListener<Spot, Link> for Tally {
    fn graph_rebuilt(&self, _graph: &Graph) {
        self.rebuilt.fetch_add(1, Ordering::Relaxed);
    }

    fn vertex_added(&self, _graph: &Graph, _vertex: &PoolObject<Spot>) {
        self.per_edit.fetch_add(1, Ordering::Relaxed);
    }

    fn vertex_removed(&self, _graph: &Graph, _vertex: &PoolObject<Spot>) {
        self.per_edit.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_added(&self, _graph: &Graph, _edge: &PoolObject<Link>) {
        self.per_edit.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_removed(&self, _graph: &Graph, _edge: &PoolObject<Link>) {
        self.per_edit.fetch_add(1, Ordering::Relaxed);
    }
}

fn new_graph() -> Result<Graph> {
    ListenableGraph::new(GraphOptions::default())
}

fn random_graph(vertices: usize, edges: usize, rng: &mut ChaCha8Rng) -> Result<(Graph, Vec<PoolObject<Spot>>)> {
    let mut graph = new_graph()?;
    let mut spots = Vec::with_capacity(vertices);
    for id in 0..vertices {
        let spot = graph.add_vertex()?;
        graph.set_vertex_field(&spot, ID_OFFSET, id as i32);
        spots.push(spot);
    }
    for _ in 0..edges {
        let source = &spots[rng.gen_range(0..vertices)];
        let target = &spots[rng.gen_range(0..vertices)];
        let edge = graph.add_edge(source, target)?;
        graph.release_edge_ref(edge);
    }
    Ok((graph, spots))
}

#[test]
fn removing_path_middle_leaves_endpoints() -> Result<()> {
    let mut graph = new_graph()?;
    let a = graph.add_vertex()?;
    let b = graph.add_vertex()?;
    let c = graph.add_vertex()?;
    let ab = graph.add_edge(&a, &b)?;
    let bc = graph.add_edge(&b, &c)?;

    assert!(graph.remove_vertex(&b));

    assert!(!graph.contains_edge(&ab));
    assert!(!graph.contains_edge(&bc));
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.contains_vertex(&a));
    assert!(graph.contains_vertex(&c));
    let live: HashSet<_> = graph.vertices().collect();
    assert_eq!(live, HashSet::from([a, c]));
    Ok(())
}

#[test]
fn bulk_load_sends_single_notification() -> Result<()> {
    let mut graph = new_graph()?;
    let tally = Arc::new(Tally::default());
    graph.add_graph_listener(tally.clone());

    graph.pause_listeners();
    for _ in 0..1000 {
        let vertex = graph.add_vertex()?;
        graph.release_vertex_ref(vertex);
    }
    graph.resume_listeners();

    assert_eq!(tally.calls(), 1);
    assert_eq!(tally.rebuilt.load(Ordering::Relaxed), 1);
    assert_eq!(graph.vertex_count(), 1000);
    Ok(())
}

fn perform_edits(graph: &mut Graph) -> Result<usize> {
    let a = graph.add_vertex()?;
    let b = graph.add_vertex()?;
    let c = graph.add_vertex()?;
    let ab = graph.add_edge(&a, &b)?;
    graph.add_edge(&b, &c)?;
    graph.remove_edge(&ab);
    graph.remove_vertex(&c);
    // 3 vertices, 2 edges, 1 edge removal, then 1 cascaded edge + 1 vertex
    Ok(3 + 2 + 1 + 2)
}

#[test]
fn edits_are_reported_individually_only_while_emitting() -> Result<()> {
    let mut emitting = new_graph()?;
    let live = Arc::new(Tally::default());
    emitting.add_graph_listener(live.clone());
    let k = perform_edits(&mut emitting)?;
    assert_eq!(live.per_edit.load(Ordering::Relaxed), k);
    assert_eq!(live.rebuilt.load(Ordering::Relaxed), 0);

    let mut paused = new_graph()?;
    let batched = Arc::new(Tally::default());
    paused.add_graph_listener(batched.clone());
    paused.pause_listeners();
    perform_edits(&mut paused)?;
    paused.resume_listeners();
    assert_eq!(batched.per_edit.load(Ordering::Relaxed), 0);
    assert_eq!(batched.rebuilt.load(Ordering::Relaxed), 1);

    assert_eq!(emitting.vertex_count(), paused.vertex_count());
    assert_eq!(emitting.edge_count(), paused.edge_count());
    Ok(())
}

#[test]
fn vertex_removal_drops_exactly_its_incident_edges() -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let (mut graph, spots) = random_graph(200, 1_500, &mut rng)?;

    for victim in spots.iter().step_by(7) {
        let incident = graph.edges_of(victim, Dir::Both).count();
        let before = graph.edge_count();
        assert!(graph.remove_vertex(victim));
        assert_eq!(graph.edge_count(), before - incident);

        let index = victim.index();
        let mut scratch = graph.vertex_ref();
        for edge in graph.edges() {
            assert_ne!(graph.edge_source(&edge, &mut scratch).index(), index);
            assert_ne!(graph.edge_target(&edge, &mut scratch).index(), index);
        }
        graph.release_vertex_ref(scratch);
    }

    let out: usize = graph.vertices().map(|v| graph.outgoing_edges(&v).count()).sum();
    let inc: usize = graph.vertices().map(|v| graph.incoming_edges(&v).count()).sum();
    assert_eq!(out, graph.edge_count());
    assert_eq!(inc, graph.edge_count());
    Ok(())
}

#[test]
fn ids_round_trip_while_live() -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED ^ 1);
    let (mut graph, spots) = random_graph(64, 256, &mut rng)?;
    for spot in spots.iter().filter(|_| rng.gen_bool(0.25)) {
        graph.remove_vertex(spot);
    }

    let vertex_ids = graph.vertex_id_bimap();
    let mut scratch = vertex_ids.create_ref();
    for spot in spots.iter().filter(|s| graph.contains_vertex(s)) {
        let id = vertex_ids.get_id(spot);
        assert_eq!(vertex_ids.get_object(id, &mut scratch).index(), spot.index());
        assert_eq!(
            graph.vertex_field::<i32>(&scratch, ID_OFFSET),
            graph.vertex_field::<i32>(spot, ID_OFFSET)
        );
    }
    vertex_ids.release_ref(scratch);

    let edge_ids = graph.edge_id_bimap();
    let mut scratch = edge_ids.create_ref();
    for edge in graph.edges() {
        assert_eq!(*edge_ids.get_object(edge_ids.get_id(&edge), &mut scratch), edge);
    }
    Ok(())
}

/// Saves a graph as dense ids and loads it into another, the way a
/// serializer drives the id mappings.
#[test]
fn save_and_load_through_id_mappings() -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED ^ 2);
    let (mut source, spots) = random_graph(50, 120, &mut rng)?;
    source.remove_vertex(&spots[3]);
    source.remove_vertex(&spots[17]);

    let ids = source.id_bimap();
    let saved_vertices: Vec<(usize, i32)> = source
        .vertices()
        .map(|v| (ids.vertex_id(&v), source.vertex_field(&v, ID_OFFSET)))
        .collect();
    let mut scratch = source.vertex_ref();
    let saved_edges: Vec<(usize, usize)> = source
        .edges()
        .map(|e| {
            let s = ids.vertex_id(source.edge_source(&e, &mut scratch));
            let t = ids.vertex_id(source.edge_target(&e, &mut scratch));
            (s, t)
        })
        .collect();

    let mut target = new_graph()?;
    let tally = Arc::new(Tally::default());
    target.add_graph_listener(tally.clone());
    let mut stale = target.add_vertex()?;
    target.pause_listeners();
    target.clear();
    let mut loaded = std::collections::HashMap::new();
    for &(saved_id, label) in &saved_vertices {
        let vertex = target.add_vertex_into(&mut stale)?.clone();
        target.set_vertex_field(&vertex, ID_OFFSET, label);
        loaded.insert(saved_id, vertex);
    }
    for (s, t) in &saved_edges {
        let edge = target.add_edge(&loaded[s], &loaded[t])?;
        target.release_edge_ref(edge);
    }
    target.resume_listeners();

    assert_eq!(tally.per_edit.load(Ordering::Relaxed), 1);
    assert_eq!(tally.rebuilt.load(Ordering::Relaxed), 1);
    assert_eq!(target.vertex_count(), saved_vertices.len());
    assert_eq!(target.edge_count(), saved_edges.len());
    let mut labels_before: Vec<i32> = saved_vertices.iter().map(|&(_, l)| l).collect();
    let mut labels_after: Vec<i32> = target
        .vertices()
        .map(|v| target.vertex_field(&v, ID_OFFSET))
        .collect();
    labels_before.sort_unstable();
    labels_after.sort_unstable();
    assert_eq!(labels_before, labels_after);
    Ok(())
}
