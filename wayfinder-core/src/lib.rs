//! wayfinder-core: Waypoint routing and guidance math
//!
//! Holds everything the indoor navigator needs that does not touch a camera
//! or an audio device:
//! - distance/alignment estimation from a marker's pixel geometry
//! - the undirected waypoint graph and Dijkstra route planning
//! - turn-by-turn narration of a computed route
//! - the built-in floor topology and its coordinate map
//! - the voice service interfaces used by the guidance loop

pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod narration;
pub mod navigator;
pub mod route;
pub mod topology;
pub mod voice;

pub use config::NavigationConfig;
pub use error::{Error, Result};
pub use geometry::{Alignment, GeometryEstimator, Guidance, PixelPoint};
pub use graph::{NodeId, WaypointGraph};
pub use narration::narrate;
pub use navigator::{Navigator, RoutePlan};
pub use route::{RoutePath, RoutePlanner};
pub use topology::{CoordinateMap, Topology};
pub use voice::{SpeechRecognizer, SpeechSink};
