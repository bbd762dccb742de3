//! Incidence lists threaded through vertex and edge records.
//!
//! Every vertex heads two singly linked lists of edge indices: outgoing edges
//! chained through each edge's next-source link, incoming edges chained
//! through its next-target link. A self-loop sits in both lists of its
//! vertex.

use crate::pool::{Pool, PoolObject, Record};

use super::edge::{
    NEXT_SOURCE_EDGE_INDEX_OFFSET, NEXT_TARGET_EDGE_INDEX_OFFSET, SOURCE_INDEX_OFFSET,
};

/// Link value meaning "no record".
pub const NO_LINK: i32 = -1;

/// Direction of incident edges relative to a vertex.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dir {
    /// Edges whose source is the vertex.
    Out,
    /// Edges whose target is the vertex.
    In,
    /// Both; self-loops are reported once.
    Both,
}

impl Dir {
    /// Whether outgoing edges are included.
    pub fn includes_out(self) -> bool {
        matches!(self, Dir::Out | Dir::Both)
    }

    /// Whether incoming edges are included.
    pub fn includes_in(self) -> bool {
        matches!(self, Dir::In | Dir::Both)
    }
}

/// Which list of a vertex an edge is chained into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Chain {
    Out,
    In,
}

impl Chain {
    pub(crate) fn head_offset(self) -> usize {
        match self {
            Chain::Out => super::vertex::FIRST_OUT_EDGE_INDEX_OFFSET,
            Chain::In => super::vertex::FIRST_IN_EDGE_INDEX_OFFSET,
        }
    }

    pub(crate) fn next_offset(self) -> usize {
        match self {
            Chain::Out => NEXT_SOURCE_EDGE_INDEX_OFFSET,
            Chain::In => NEXT_TARGET_EDGE_INDEX_OFFSET,
        }
    }
}

/// Appends edge `edge` to the `chain` list of vertex `vertex`.
pub(crate) fn append<V: Record, E: Record>(
    vertices: &mut Pool<V>,
    edges: &mut Pool<E>,
    vertex: usize,
    chain: Chain,
    edge: usize,
) {
    let next_offset = chain.next_offset();
    edges.set_field_at(edge, next_offset, NO_LINK);
    let head: i32 = vertices.field_at(vertex, chain.head_offset());
    if head == NO_LINK {
        vertices.set_field_at(vertex, chain.head_offset(), edge as i32);
        return;
    }
    let mut last = head as usize;
    loop {
        let next: i32 = edges.field_at(last, next_offset);
        if next == NO_LINK {
            break;
        }
        last = next as usize;
    }
    edges.set_field_at(last, next_offset, edge as i32);
}

/// Removes edge `edge` from the `chain` list of vertex `vertex`.
pub(crate) fn unlink<V: Record, E: Record>(
    vertices: &mut Pool<V>,
    edges: &mut Pool<E>,
    vertex: usize,
    chain: Chain,
    edge: usize,
) {
    let next_offset = chain.next_offset();
    let after: i32 = edges.field_at(edge, next_offset);
    let head: i32 = vertices.field_at(vertex, chain.head_offset());
    if head == edge as i32 {
        vertices.set_field_at(vertex, chain.head_offset(), after);
        return;
    }
    let mut prev = head;
    while prev != NO_LINK {
        let next: i32 = edges.field_at(prev as usize, next_offset);
        if next == edge as i32 {
            edges.set_field_at(prev as usize, next_offset, after);
            return;
        }
        prev = next;
    }
    debug_assert!(false, "edge {edge} missing from {chain:?} list of vertex {vertex}");
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Stage {
    Out,
    In,
    Done,
}

/// Lazy iterator over the edges incident to one vertex.
///
/// Walks the intrusive lists directly; yields stack-only refs and never
/// allocates.
pub struct IncidentEdges<'a, E: Record> {
    edges: Option<&'a Pool<E>>,
    vertex: usize,
    dir: Dir,
    stage: Stage,
    next: i32,
    first_in: i32,
}

impl<'a, E: Record> IncidentEdges<'a, E> {
    pub(crate) fn new<V: Record>(
        vertices: &Pool<V>,
        edges: &'a Pool<E>,
        vertex: &PoolObject<V>,
        dir: Dir,
    ) -> Self {
        let index = vertex.index();
        let first_out: i32 = vertices.field_at(index, Chain::Out.head_offset());
        let first_in: i32 = vertices.field_at(index, Chain::In.head_offset());
        let (stage, next) = if dir.includes_out() {
            (Stage::Out, first_out)
        } else {
            (Stage::In, first_in)
        };
        Self {
            edges: Some(edges),
            vertex: index,
            dir,
            stage,
            next,
            first_in,
        }
    }

    pub(crate) fn empty(dir: Dir) -> Self {
        Self {
            edges: None,
            vertex: 0,
            dir,
            stage: Stage::Done,
            next: NO_LINK,
            first_in: NO_LINK,
        }
    }
}

impl<E: Record> Iterator for IncidentEdges<'_, E> {
    type Item = PoolObject<E>;

    fn next(&mut self) -> Option<PoolObject<E>> {
        let edges = self.edges?;
        loop {
            match self.stage {
                Stage::Done => return None,
                Stage::Out => {
                    if self.next == NO_LINK {
                        if self.dir.includes_in() {
                            self.stage = Stage::In;
                            self.next = self.first_in;
                        } else {
                            self.stage = Stage::Done;
                        }
                        continue;
                    }
                    let index = self.next as usize;
                    self.next = edges.field_at(index, NEXT_SOURCE_EDGE_INDEX_OFFSET);
                    let mut edge = PoolObject::unbound(edges.id());
                    edges.get_by_index(index, &mut edge);
                    return Some(edge);
                }
                Stage::In => {
                    if self.next == NO_LINK {
                        self.stage = Stage::Done;
                        continue;
                    }
                    let index = self.next as usize;
                    self.next = edges.field_at(index, NEXT_TARGET_EDGE_INDEX_OFFSET);
                    if self.dir == Dir::Both {
                        let source: i32 = edges.field_at(index, SOURCE_INDEX_OFFSET);
                        if source as usize == self.vertex {
                            continue;
                        }
                    }
                    let mut edge = PoolObject::unbound(edges.id());
                    edges.get_by_index(index, &mut edge);
                    return Some(edge);
                }
            }
        }
    }
}
