use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use itertools::Itertools;

use crate::errors::GraphError;

pub struct GraphBuilder<T> {
    nodes: HashMap<T, usize>,
    nodes_reversed: Vec<T>,
    edges: HashSet<(usize, usize)>,
}

impl<T> GraphBuilder<T> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            nodes_reversed: Vec::new(),
            edges: HashSet::new(),
        }
    }
}

impl<T: Eq + Hash + Debug + Clone> GraphBuilder<T> {
    // Idempotent; the node universe is a union of table columns and
    // contains repeats.
    pub fn add_node(&mut self, node: T) -> usize {
        match self.nodes.entry(node) {
            std::collections::hash_map::Entry::Occupied(o) => *o.get(),
            std::collections::hash_map::Entry::Vacant(v) => {
                let index = self.nodes_reversed.len();
                self.nodes_reversed.push(v.key().clone());
                v.insert(index);
                index
            }
        }
    }

    pub fn add_edge(&mut self, from: &T, to: &T) -> Result<(), GraphError> {
        let from_index = *self.nodes.get(from)
            .ok_or_else(|| GraphError::UndefinedVertex { vertex: format!("{:?}", from) })?;
        let to_index = *self.nodes.get(to)
            .ok_or_else(|| GraphError::UndefinedVertex { vertex: format!("{:?}", to) })?;
        self.edges.insert((from_index, to_index));
        self.edges.insert((to_index, from_index));
        Ok(())
    }

    pub fn build(self) -> super::core::Graph<T> {
        let mut adjacency = vec![HashSet::new(); self.nodes_reversed.len()];
        for (from, to) in self.edges {
            adjacency[from].insert(to);
        }
        super::core::Graph::new(self.nodes, self.nodes_reversed, adjacency)
    }
}

/// Build the known-edge graph: every node of the universe is present, even
/// when isolated; edges come from positive training pairs only.
///
/// The universe is sorted before interning so node indexes are stable
/// across runs.
pub fn build_graph<T, U, E>(universe: U, positive_edges: E) -> Result<super::core::Graph<T>, GraphError>
where
    T: Eq + Hash + Ord + Debug + Clone,
    U: IntoIterator<Item = T>,
    E: IntoIterator<Item = (T, T)>,
{
    let mut builder = GraphBuilder::new();
    for node in universe.into_iter().sorted() {
        builder.add_node(node);
    }
    for (from, to) in positive_edges {
        builder.add_edge(&from, &to)?;
    }
    Ok(builder.build())
}
