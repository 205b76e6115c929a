//! Storage of the nodes, addressed by id

use log::trace;

use crate::network::id_pool::IdPool;
use crate::network::node::{Node, NodeKind};

/// Storage for the nodes of a network
///
/// Nodes live at stable indices given by their id. Released slots are kept and reinitialized
/// when their id is handed out again; storage is never compacted.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    ids: IdPool,
}

impl NodeArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node of the given kind at the smallest free id
    ///
    /// All transient fields of the slot (connections, flags, cached level, association) are reset.
    pub fn alloc_node(&mut self, kind: NodeKind) -> usize {
        let id = self.ids.alloc();
        if id == self.nodes.len() {
            self.nodes.push(Node::new(id, kind));
        } else {
            assert!(id < self.nodes.len());
            self.nodes[id] = Node::new(id, kind);
        }
        trace!("Allocated node {id} as {kind:?}");
        id
    }

    /// Release a node id; the slot content is undefined until reallocated
    pub fn release_node(&mut self, id: usize) {
        self.ids.release(id);
        trace!("Released node {id}");
    }

    /// Returns whether the id is currently allocated
    pub fn is_live(&self, id: usize) -> bool {
        self.ids.is_allocated(id)
    }

    /// Bound on the ids of live nodes
    pub fn max_id(&self) -> usize {
        self.ids.capacity()
    }

    /// Number of live nodes
    pub fn nb_live(&self) -> usize {
        self.ids.nb_allocated()
    }

    /// Access a live node
    pub fn get(&self, id: usize) -> &Node {
        assert!(self.is_live(id), "Node {id} is not allocated");
        &self.nodes[id]
    }

    /// Access a live node mutably
    pub fn get_mut(&mut self, id: usize) -> &mut Node {
        assert!(self.is_live(id), "Node {id} is not allocated");
        &mut self.nodes[id]
    }

    /// Iterate over the live nodes
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| self.is_live(n.id))
    }

    /// Release all nodes; slot storage is kept
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
