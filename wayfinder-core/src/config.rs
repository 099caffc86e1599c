//! Configuration for route planning

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Topology file replacing the built-in floor (TOML or JSON)
    pub topology_path: Option<PathBuf>,
    /// Floor-map image the route overlay is drawn on
    pub map_image: Option<PathBuf>,
    /// How long the recognizer waits for a spoken destination
    pub recognizer_timeout_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            topology_path: None,
            map_image: None,
            recognizer_timeout_ms: 5_000,
        }
    }
}

impl NavigationConfig {
    pub fn recognizer_timeout(&self) -> Duration {
        Duration::from_millis(self.recognizer_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.recognizer_timeout_ms == 0 {
            return Err("Recognizer timeout must be non-zero".to_string());
        }
        if self.recognizer_timeout_ms > 60_000 {
            return Err("Recognizer timeout too large (max 60s)".to_string());
        }
        Ok(())
    }
}
