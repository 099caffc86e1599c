//! Dijkstra route planning over a [`WaypointGraph`]

use crate::error::Result;
use crate::graph::{NodeId, WaypointGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Ordered visit sequence from start to end inclusive.
///
/// Empty means the destination is unreachable. A route from a node to itself
/// is the single-element path `[start]` with zero cost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePath {
    nodes: Vec<String>,
    cost: u64,
}

impl RoutePath {
    pub fn new(nodes: Vec<String>, cost: u64) -> Self {
        Self { nodes, cost }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<String> {
        self.nodes
    }

    /// Sum of edge weights along the path
    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when there is at least one hop to walk
    pub fn is_navigable(&self) -> bool {
        self.nodes.len() >= 2
    }

    pub fn start(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }

    pub fn destination(&self) -> Option<&str> {
        self.nodes.last().map(String::as_str)
    }

    /// Consecutive `(from, to)` legs
    pub fn legs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes
            .windows(2)
            .map(|w| (w[0].as_str(), w[1].as_str()))
    }
}

/// Shortest-path engine bound to an immutable graph.
///
/// Borrowing the graph guarantees no route is computed while the topology is
/// still being built.
pub struct RoutePlanner<'g> {
    graph: &'g WaypointGraph,
    /// Lexicographic rank of each node name, used as the tie-breaker
    rank: Vec<u32>,
}

impl<'g> RoutePlanner<'g> {
    pub fn new(graph: &'g WaypointGraph) -> Self {
        let mut order: Vec<NodeId> = (0..graph.node_count() as u32).map(NodeId).collect();
        order.sort_by(|a, b| graph.name(*a).cmp(graph.name(*b)));
        let mut rank = vec![0u32; order.len()];
        for (position, id) in order.into_iter().enumerate() {
            rank[id.index()] = position as u32;
        }
        Self { graph, rank }
    }

    pub fn graph(&self) -> &WaypointGraph {
        self.graph
    }

    /// Shortest path from `start` to `end`.
    ///
    /// Unknown endpoints fail with `NodeNotFound` before any search runs.
    pub fn compute_route(&self, start: &str, end: &str) -> Result<RoutePath> {
        let source = self.graph.require(start)?;
        let target = self.graph.require(end)?;

        if source == target {
            return Ok(RoutePath {
                nodes: vec![start.to_string()],
                cost: 0,
            });
        }

        let n = self.graph.node_count();
        let mut dist: Vec<Option<u64>> = vec![None; n];
        let mut prev: Vec<Option<NodeId>> = vec![None; n];
        // (distance, name rank, node): ties resolve by name
        let mut open: BTreeSet<(u64, u32, NodeId)> = BTreeSet::new();

        dist[source.index()] = Some(0);
        open.insert((0, self.rank[source.index()], source));

        while let Some((d, _, u)) = open.pop_first() {
            if u == target {
                break;
            }
            for edge in self.graph.adjacent(u) {
                let v = edge.to;
                let candidate = d.saturating_add(edge.weight);
                let improves = match dist[v.index()] {
                    Some(current) => candidate < current,
                    None => true,
                };
                if improves {
                    if let Some(stale) = dist[v.index()] {
                        open.remove(&(stale, self.rank[v.index()], v));
                    }
                    dist[v.index()] = Some(candidate);
                    prev[v.index()] = Some(u);
                    open.insert((candidate, self.rank[v.index()], v));
                }
            }
        }

        let Some(cost) = dist[target.index()] else {
            debug!("no route from '{}' to '{}'", start, end);
            return Ok(RoutePath::unreachable());
        };

        let mut nodes = vec![self.graph.name(target).to_string()];
        let mut at = target;
        while let Some(p) = prev[at.index()] {
            nodes.push(self.graph.name(p).to_string());
            at = p;
        }
        nodes.reverse();

        info!("route {} -> {}: {} stops, cost {}", start, end, nodes.len(), cost);
        Ok(RoutePath { nodes, cost })
    }
}
