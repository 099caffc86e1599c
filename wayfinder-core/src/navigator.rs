//! Route-planning session: picks a destination, computes the route and
//! speaks the narration.

use crate::error::Result;
use crate::graph::WaypointGraph;
use crate::narration::{self, narrate};
use crate::route::{RoutePath, RoutePlanner};
use crate::topology::{CoordinateMap, Topology};
use crate::voice::{SpeechRecognizer, SpeechSink};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A computed route and what was said about it
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub origin: String,
    pub destination: String,
    pub path: RoutePath,
    /// `None` when nothing navigable was found
    pub narration: Option<String>,
}

impl RoutePlan {
    pub fn is_navigable(&self) -> bool {
        self.path.is_navigable()
    }
}

pub struct Navigator {
    graph: WaypointGraph,
    destinations: Vec<String>,
    coordinates: CoordinateMap,
    speech: Arc<dyn SpeechSink>,
}

impl Navigator {
    /// Build the graph once; it is read-only for the navigator's lifetime.
    pub fn new(topology: &Topology, speech: Arc<dyn SpeechSink>) -> Result<Self> {
        topology.validate()?;
        let graph = topology.build_graph()?;
        info!(
            "Navigator ready: {} waypoints, {} corridors, {} destinations",
            graph.node_count(),
            graph.edge_count(),
            topology.destinations.len()
        );
        Ok(Self {
            graph,
            destinations: topology.destinations.clone(),
            coordinates: topology.coordinates(),
            speech,
        })
    }

    pub fn graph(&self) -> &WaypointGraph {
        &self.graph
    }

    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    pub fn coordinates(&self) -> &CoordinateMap {
        &self.coordinates
    }

    pub fn route(&self, from: &str, to: &str) -> Result<RoutePath> {
        RoutePlanner::new(&self.graph).compute_route(from, to)
    }

    /// Any destination other than `current`
    pub fn random_destination<R: Rng + ?Sized>(&self, current: &str, rng: &mut R) -> Option<String> {
        let choices: Vec<&String> = self.destinations.iter().filter(|d| *d != current).collect();
        choices.choose(rng).map(|d| d.to_string())
    }

    /// Ask for a destination and wait for one recognized utterance.
    pub fn destination_by_voice(&self, recognizer: &dyn SpeechRecognizer, timeout: Duration) -> Option<String> {
        self.speech.speak(narration::ASK_DESTINATION);
        match recognizer.recognize(timeout) {
            Some(heard) => {
                info!("Recognized destination: {}", heard);
                self.speech.speak(&format!(
                    "I heard {}. Is this correct? Please scan your current location to confirm.",
                    heard
                ));
                Some(heard)
            }
            None => {
                warn!("No destination recognized within {:?}", timeout);
                self.speech.speak(narration::NOT_UNDERSTOOD);
                None
            }
        }
    }

    /// Compute and announce the route from `origin` to `destination`.
    pub fn plan(&self, origin: &str, destination: &str) -> Result<RoutePlan> {
        if origin == destination {
            self.graph.require(origin)?;
            self.speech.speak(narration::ALREADY_THERE);
            return Ok(RoutePlan {
                origin: origin.to_string(),
                destination: destination.to_string(),
                path: self.route(origin, destination)?,
                narration: None,
            });
        }

        self.speech.speak(&narration::destination_assigned(destination));
        let path = self.route(origin, destination)?;

        let narration = if path.is_navigable() {
            let text = narrate(path.nodes());
            self.speech.speak(&text);
            Some(text)
        } else {
            warn!("No route from '{}' to '{}'", origin, destination);
            self.speech.speak(narration::NO_ROUTE);
            None
        };

        Ok(RoutePlan {
            origin: origin.to_string(),
            destination: destination.to_string(),
            path,
            narration,
        })
    }
}
