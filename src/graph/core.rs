use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use crate::errors::FeatureError;

/// What to do when a common neighbour has degree 1, making the
/// Adamic-Adar term 1/ln(1) undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeOnePolicy {
    /// Drop the undefined term from the sum.
    Skip,
    /// Surface the offending neighbour as an error.
    Fail,
}

/// Immutable undirected graph over an interned node universe.
///
/// Built once from the training edges, then shared read-only across
/// feature-extraction workers. Metric lookups on absent nodes return the
/// metric's default instead of failing; absence is domain-expected here.
pub struct Graph<T> {
    nodes: HashMap<T, usize>,
    nodes_reversed: Vec<T>,
    adjacency: Vec<HashSet<usize>>,
}

impl<T: Eq + Hash> Graph<T> {
    pub(super) fn new(nodes: HashMap<T, usize>,
                      nodes_reversed: Vec<T>,
                      adjacency: Vec<HashSet<usize>>) -> Self
    {
        Self { nodes, nodes_reversed, adjacency }
    }

    pub fn node_count(&self) -> usize {
        self.nodes_reversed.len()
    }

    pub fn has_node(&self, node: &T) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn node_index(&self, node: &T) -> Option<usize> {
        self.nodes.get(node).copied()
    }

    pub fn neighbours(&self, node: &T) -> Option<&HashSet<usize>> {
        self.node_index(node).map(|index| &self.adjacency[index])
    }

    fn degree(&self, index: usize) -> usize {
        self.adjacency[index].len()
    }

    fn neighbour_sets(&self, a: &T, b: &T) -> Option<(&HashSet<usize>, &HashSet<usize>)> {
        let a_index = self.node_index(a)?;
        let b_index = self.node_index(b)?;
        Some((&self.adjacency[a_index], &self.adjacency[b_index]))
    }

    pub fn common_neighbour_count(&self, a: &T, b: &T) -> i32 {
        match self.neighbour_sets(a, b) {
            Some((na, nb)) => na.intersection(nb).count() as i32,
            None => 0,
        }
    }

    /// Intersection over union of the neighbour sets. Defined as 0 when
    /// either set is empty; the union may still be non-empty, but the
    /// zero-neighbour case is not worth a separate branch.
    pub fn jaccard_coefficient(&self, a: &T, b: &T) -> f64 {
        match self.neighbour_sets(a, b) {
            Some((na, nb)) => {
                if na.is_empty() || nb.is_empty() {
                    return 0.0;
                }
                let intersection = na.intersection(nb).count();
                let union = na.len() + nb.len() - intersection;
                intersection as f64 / union as f64
            }
            None => 0.0,
        }
    }

    /// Unweighted hop count between `a` and `b`; -1 when either node is
    /// absent or the nodes are disconnected.
    pub fn shortest_path_length(&self, a: &T, b: &T) -> i64 {
        let (Some(start), Some(target)) = (self.node_index(a), self.node_index(b)) else {
            return -1;
        };
        if start == target {
            return 0;
        }
        let mut distances = vec![u32::MAX; self.node_count()];
        distances[start] = 0;
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &next in &self.adjacency[current] {
                if distances[next] != u32::MAX {
                    continue;
                }
                distances[next] = distances[current] + 1;
                if next == target {
                    return distances[next] as i64;
                }
                queue.push_back(next);
            }
        }
        -1
    }
}

impl<T: Eq + Hash + Debug> Graph<T> {
    /// Sum over common neighbours z of 1/ln(deg(z)). A degree-1 common
    /// neighbour makes the term undefined; only pairs sharing an endpoint
    /// (or self-loops) can produce one, and `policy` decides whether it is
    /// dropped or reported.
    pub fn adamic_adar(&self, a: &T, b: &T, policy: DegreeOnePolicy) -> Result<f64, FeatureError> {
        let Some((na, nb)) = self.neighbour_sets(a, b) else {
            return Ok(0.0);
        };
        let mut total = 0.0;
        for &z in na.intersection(nb) {
            let degree = self.degree(z);
            if degree <= 1 {
                match policy {
                    DegreeOnePolicy::Skip => continue,
                    DegreeOnePolicy::Fail => {
                        return Err(FeatureError::UndefinedMetric {
                            vertex: format!("{:?}", self.nodes_reversed[z]),
                        });
                    }
                }
            }
            total += 1.0 / (degree as f64).ln();
        }
        Ok(total)
    }
}
