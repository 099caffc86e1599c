//! Configuration for marker scanning

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wayfinder_core::GeometryEstimator;

/// Inclusive HSV box in OpenCV 8-bit convention (H in 0..=179, S and V in 0..=255)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub name: String,
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub fn new(name: &str, lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            lower,
            upper,
        }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }

    /// Red sits on both ends of the hue circle, so it takes two boxes.
    pub fn default_bands() -> Vec<HsvRange> {
        vec![
            HsvRange::new("red-low", [0, 120, 70], [10, 255, 255]),
            HsvRange::new("red-high", [170, 120, 70], [179, 255, 255]),
            HsvRange::new("blue", [100, 150, 50], [140, 255, 255]),
            HsvRange::new("green", [40, 70, 50], [80, 255, 255]),
        ]
    }
}

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// USB camera device index (0, 1, 2, etc.)
    pub camera_id: u32,
    /// Requested capture resolution (width, height)
    pub resolution: (u32, u32),
    /// Requested capture frame rate
    pub frame_rate: u32,
    /// Marker color bands unioned into one mask
    pub color_bands: Vec<HsvRange>,
    /// Equalize the value channel before thresholding
    pub equalize_value: bool,
    /// Radius of the morphological closing, 0 disables it
    pub closing_radius: u8,
    /// Contours enclosing less than this many px² are ignored
    pub min_contour_area: f64,
    /// Polygon approximation tolerance as a fraction of the perimeter
    pub polygon_epsilon_ratio: f64,
    /// Side of the square rectified marker image
    pub rectified_size: u32,
    /// Markers wider than this are handed to the decoder
    pub proximity_threshold_px: f32,
    /// Minimum time between two spoken feedback messages
    pub feedback_interval_ms: u64,
    pub known_marker_width_cm: f32,
    pub focal_length_px: f32,
    pub alignment_tolerance_px: i32,
    /// Side of the on-screen alignment guide box
    pub guide_box_size: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let estimator = GeometryEstimator::default();
        Self {
            camera_id: 0,
            resolution: (640, 480),
            frame_rate: 30,
            color_bands: HsvRange::default_bands(),
            equalize_value: true,
            closing_radius: 5,
            min_contour_area: 1000.0,
            polygon_epsilon_ratio: 0.04,
            rectified_size: 200,
            proximity_threshold_px: 150.0,
            feedback_interval_ms: 3_000,
            known_marker_width_cm: estimator.known_marker_width_cm,
            focal_length_px: estimator.focal_length_px,
            alignment_tolerance_px: estimator.alignment_tolerance_px,
            guide_box_size: 200,
        }
    }
}

impl ScanConfig {
    pub fn estimator(&self) -> GeometryEstimator {
        GeometryEstimator::new(
            self.known_marker_width_cm,
            self.focal_length_px,
            self.alignment_tolerance_px,
        )
    }

    pub fn feedback_interval(&self) -> Duration {
        Duration::from_millis(self.feedback_interval_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_rate == 0 || self.frame_rate > 120 {
            return Err("Frame rate must be between 1 and 120".to_string());
        }

        if self.resolution.0 == 0 || self.resolution.1 == 0 {
            return Err("Resolution must be non-zero".to_string());
        }

        if self.resolution.0 > 7680 || self.resolution.1 > 4320 {
            return Err("Resolution too large (max 8K)".to_string());
        }

        if self.camera_id > 100 {
            return Err("Camera ID too large (max 100)".to_string());
        }

        if self.color_bands.is_empty() {
            return Err("At least one color band is required".to_string());
        }

        for band in &self.color_bands {
            if band.upper[0] > 179 {
                return Err(format!("Band '{}': hue must be at most 179", band.name));
            }
            if (0..3).any(|i| band.lower[i] > band.upper[i]) {
                return Err(format!("Band '{}': lower bound exceeds upper bound", band.name));
            }
        }

        if !(self.min_contour_area >= 0.0) {
            return Err("Minimum contour area must be non-negative".to_string());
        }

        if !(self.polygon_epsilon_ratio > 0.0 && self.polygon_epsilon_ratio < 1.0) {
            return Err("Polygon epsilon ratio must be in (0, 1)".to_string());
        }

        if self.rectified_size == 0 || self.rectified_size > 2048 {
            return Err("Rectified size must be between 1 and 2048".to_string());
        }

        if !(self.proximity_threshold_px > 0.0) {
            return Err("Proximity threshold must be positive".to_string());
        }

        if !(self.known_marker_width_cm > 0.0) || !(self.focal_length_px > 0.0) {
            return Err("Marker width and focal length must be positive".to_string());
        }

        if self.alignment_tolerance_px <= 0 {
            return Err("Alignment tolerance must be positive".to_string());
        }

        Ok(())
    }
}
