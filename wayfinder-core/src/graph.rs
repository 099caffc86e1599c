//! Undirected weighted waypoint graph
//!
//! Nodes are interned: the public API speaks names, internally every node is
//! a dense [`NodeId`] so the planner never hashes strings while relaxing edges.

use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

/// Interned handle of a waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Neighbor {
    pub to: NodeId,
    pub weight: u64,
}

/// Building topology. Edges are always stored in both endpoints' lists.
#[derive(Debug, Clone, Default)]
pub struct WaypointGraph {
    names: Vec<String>,
    index: HashMap<String, NodeId>,
    adjacency: Vec<Vec<Neighbor>>,
    edge_count: usize,
}

impl WaypointGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Inserting an existing name returns its handle unchanged.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = NodeId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.adjacency.push(Vec::new());
        id
    }

    /// Insert an undirected edge between two existing nodes.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: i64) -> Result<()> {
        if weight < 0 {
            return Err(Error::NegativeWeight {
                from: from.to_string(),
                to: to.to_string(),
                weight,
            });
        }
        let a = self.require(from)?;
        let b = self.require(to)?;
        let weight = weight as u64;

        self.adjacency[a.index()].push(Neighbor { to: b, weight });
        self.adjacency[b.index()].push(Neighbor { to: a, weight });
        self.edge_count += 1;
        debug!("edge {} <-> {} ({})", from, to, weight);
        Ok(())
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Like [`id`](Self::id) but fails with [`Error::NodeNotFound`].
    pub fn require(&self, name: &str) -> Result<NodeId> {
        self.id(name).ok_or_else(|| Error::NodeNotFound(name.to_string()))
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.names[id.index()]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Node names in insertion order
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// `(neighbor name, weight)` pairs of a node
    pub fn neighbors(&self, name: &str) -> Result<Vec<(&str, u64)>> {
        let id = self.require(name)?;
        Ok(self.adjacency[id.index()]
            .iter()
            .map(|n| (self.name(n.to), n.weight))
            .collect())
    }

    /// Lightest direct edge between two nodes, if any
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<u64> {
        let a = self.id(from)?;
        let b = self.id(to)?;
        self.adjacency[a.index()]
            .iter()
            .filter(|n| n.to == b)
            .map(|n| n.weight)
            .min()
    }

    pub(crate) fn adjacent(&self, id: NodeId) -> &[Neighbor] {
        &self.adjacency[id.index()]
    }
}
