use super::{Pool, PoolObject, Record};

/// Bidirectional mapping between dense integer ids and objects.
///
/// Lookups bind a caller-supplied ref instead of allocating, which is why
/// the mapping also hands refs out and takes them back.
pub trait IdBimap<O> {
    /// Id of `obj`.
    fn get_id(&self, obj: &O) -> usize;

    /// Binds `obj` to the object with `id` and returns it.
    fn get_object<'r>(&self, id: usize, obj: &'r mut O) -> &'r mut O;

    /// Borrows a ref suitable for [`IdBimap::get_object`].
    fn create_ref(&self) -> O;

    /// Returns a ref obtained from [`IdBimap::create_ref`].
    fn release_ref(&self, obj: O);
}

/// Id mapping where the id of a record is its slot index.
///
/// Keeps no state of its own. Ids stay valid while the record is live; a
/// deleted-and-recreated record may come back under a different id, and a
/// freed id may be handed to an unrelated new record.
pub struct PoolObjectIdBimap<'a, R: Record> {
    pool: &'a Pool<R>,
}

impl<'a, R: Record> PoolObjectIdBimap<'a, R> {
    /// Maps ids onto the records of `pool`.
    pub fn new(pool: &'a Pool<R>) -> Self {
        Self { pool }
    }
}

impl<R: Record> Clone for PoolObjectIdBimap<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Record> Copy for PoolObjectIdBimap<'_, R> {}

impl<R: Record> IdBimap<PoolObject<R>> for PoolObjectIdBimap<'_, R> {
    #[inline]
    fn get_id(&self, obj: &PoolObject<R>) -> usize {
        obj.index()
    }

    #[inline]
    fn get_object<'r>(&self, id: usize, obj: &'r mut PoolObject<R>) -> &'r mut PoolObject<R> {
        self.pool.get_by_index(id, obj)
    }

    fn create_ref(&self) -> PoolObject<R> {
        self.pool.create_ref()
    }

    fn release_ref(&self, obj: PoolObject<R>) {
        self.pool.release_ref(obj);
    }
}

/// The vertex and edge id mappings of one graph, as handed to serializers.
pub struct GraphIdBimap<'a, V: Record, E: Record> {
    vertices: PoolObjectIdBimap<'a, V>,
    edges: PoolObjectIdBimap<'a, E>,
}

impl<'a, V: Record, E: Record> GraphIdBimap<'a, V, E> {
    /// Combines the mappings of a vertex pool and an edge pool.
    pub fn new(vertices: &'a Pool<V>, edges: &'a Pool<E>) -> Self {
        Self {
            vertices: PoolObjectIdBimap::new(vertices),
            edges: PoolObjectIdBimap::new(edges),
        }
    }

    /// Vertex id mapping.
    pub fn vertex_id_bimap(&self) -> PoolObjectIdBimap<'a, V> {
        self.vertices
    }

    /// Edge id mapping.
    pub fn edge_id_bimap(&self) -> PoolObjectIdBimap<'a, E> {
        self.edges
    }

    /// Id of a vertex.
    pub fn vertex_id(&self, vertex: &PoolObject<V>) -> usize {
        self.vertices.get_id(vertex)
    }

    /// Binds `vertex` to the vertex with `id`.
    pub fn vertex<'r>(&self, id: usize, vertex: &'r mut PoolObject<V>) -> &'r mut PoolObject<V> {
        self.vertices.get_object(id, vertex)
    }

    /// Id of an edge.
    pub fn edge_id(&self, edge: &PoolObject<E>) -> usize {
        self.edges.get_id(edge)
    }

    /// Binds `edge` to the edge with `id`.
    pub fn edge<'r>(&self, id: usize, edge: &'r mut PoolObject<E>) -> &'r mut PoolObject<E> {
        self.edges.get_object(id, edge)
    }
}
