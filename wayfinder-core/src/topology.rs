//! Static floor topology: waypoints, corridors, floor-map positions
//!
//! The built-in table describes one faculty floor. A replacement can be
//! loaded from TOML or JSON with the same shape.

use crate::error::{Error, Result};
use crate::geometry::PixelPoint;
use crate::graph::WaypointGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub name: String,
    /// Pixel position on the floor-map image
    #[serde(default)]
    pub position: Option<PixelPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyEdge {
    pub from: String,
    pub to: String,
    pub weight: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub nodes: Vec<TopologyNode>,
    pub edges: Vec<TopologyEdge>,
    /// Nodes a user may pick as a destination; also the recognizer grammar
    #[serde(default)]
    pub destinations: Vec<String>,
}

/// Node name to floor-map pixel position. Only used for drawing.
pub type CoordinateMap = HashMap<String, PixelPoint>;

const FLOOR_NODES: &[(&str, i32, i32)] = &[
    ("Right Corner of N001", 1600, 631),
    ("N001", 1504, 622),
    ("N002", 1373, 610),
    ("N003", 1245, 598),
    ("Main Entrance", 1189, 588),
    ("Main Entrance Stair", 1147, 591),
    ("The Olive Place", 1159, 653),
    ("N004", 1004, 610),
    ("N005", 874, 622),
    ("N006", 747, 633),
    ("Alley 1 in front N006", 755, 671),
    ("N007", 622, 646),
    ("Left Corner of N007", 564, 657),
    ("N008", 562, 705),
    ("Toilets Near N008", 755, 706),
    ("N009", 801, 709),
    ("N010", 964, 711),
    ("Left Corner of N011", 1158, 704),
    ("N011", 1180, 708),
    ("N012", 1348, 712),
    ("Toilets Near N012", 1587, 711),
];

const FLOOR_EDGES: &[(&str, &str)] = &[
    ("Right Corner of N001", "N001"),
    ("N001", "N002"),
    ("N002", "N003"),
    ("N003", "Main Entrance"),
    ("Main Entrance", "Main Entrance Stair"),
    ("Main Entrance Stair", "N004"),
    ("N004", "N005"),
    ("N005", "N006"),
    ("N006", "N007"),
    ("N007", "Left Corner of N007"),
    ("Left Corner of N007", "N008"),
    ("N008", "Toilets Near N008"),
    ("Toilets Near N008", "N009"),
    ("N009", "N010"),
    ("N010", "Left Corner of N011"),
    ("Left Corner of N011", "N011"),
    ("N011", "N012"),
    ("N012", "Toilets Near N012"),
    ("Toilets Near N012", "Right Corner of N001"),
    ("Main Entrance Stair", "The Olive Place"),
    ("N006", "Alley 1 in front N006"),
    ("Alley 1 in front N006", "The Olive Place"),
    ("Left Corner of N011", "The Olive Place"),
];

const CORRIDOR_WEIGHT: i64 = 10;

const FLOOR_DESTINATIONS: &[&str] = &[
    "N001",
    "N002",
    "N003",
    "Main Entrance",
    "Main Entrance Stair",
    "The Olive Place",
    "N004",
    "N005",
    "N006",
    "N007",
    "N008",
    "Toilets Near N008",
    "N009",
    "N010",
    "N011",
    "N012",
    "Toilets Near N012",
];

impl Default for Topology {
    fn default() -> Self {
        Self::builtin_floor()
    }
}

impl Topology {
    /// The built-in single-floor layout
    pub fn builtin_floor() -> Self {
        Self {
            nodes: FLOOR_NODES
                .iter()
                .map(|(name, x, y)| TopologyNode {
                    name: name.to_string(),
                    position: Some(PixelPoint::new(*x, *y)),
                })
                .collect(),
            edges: FLOOR_EDGES
                .iter()
                .map(|(from, to)| TopologyEdge {
                    from: from.to_string(),
                    to: to.to_string(),
                    weight: CORRIDOR_WEIGHT,
                })
                .collect(),
            destinations: FLOOR_DESTINATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Load from a `.toml` or `.json` file (decided by extension, TOML otherwise)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let topology = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_toml(&content)?,
        };
        info!(
            "Loaded topology from {}: {} nodes, {} edges",
            path.display(),
            topology.nodes.len(),
            topology.edges.len()
        );
        Ok(topology)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Build the routing graph. Fails on edges that reference unknown nodes
    /// or carry negative weights.
    pub fn build_graph(&self) -> Result<WaypointGraph> {
        let mut graph = WaypointGraph::new();
        for node in &self.nodes {
            graph.add_node(&node.name);
        }
        for edge in &self.edges {
            graph.add_edge(&edge.from, &edge.to, edge.weight)?;
        }
        Ok(graph)
    }

    pub fn coordinates(&self) -> CoordinateMap {
        self.nodes
            .iter()
            .filter_map(|n| n.position.map(|p| (n.name.clone(), p)))
            .collect()
    }

    /// Every destination must name a node
    pub fn validate(&self) -> Result<()> {
        for dest in &self.destinations {
            if !self.nodes.iter().any(|n| &n.name == dest) {
                return Err(Error::NodeNotFound(dest.clone()));
            }
        }
        Ok(())
    }
}
