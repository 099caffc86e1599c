//! Distance and lateral alignment estimation from marker pixel geometry

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer pixel coordinate in frame space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Which way the camera should pan to center the marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Aligned,
    MoveRight,
    MoveLeft,
}

impl Alignment {
    pub fn phrase(&self) -> &'static str {
        match self {
            Alignment::Aligned => "Aligned.",
            Alignment::MoveRight => "Move camera to the right.",
            Alignment::MoveLeft => "Move camera to the left.",
        }
    }
}

/// Result of one guidance estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guidance {
    pub distance_cm: f32,
    pub alignment: Alignment,
}

impl fmt::Display for Guidance {
    /// Spoken form, e.g. `"Aligned. 97 centimeters away. "`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} centimeters away. ",
            self.alignment.phrase(),
            self.distance_cm as i64
        )
    }
}

/// Pinhole-model estimator. All parameters are fixed calibration constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryEstimator {
    /// Physical marker side length
    pub known_marker_width_cm: f32,
    /// Camera focal length in pixels
    pub focal_length_px: f32,
    /// Horizontal offset under which the marker counts as centered
    pub alignment_tolerance_px: i32,
}

impl Default for GeometryEstimator {
    fn default() -> Self {
        Self {
            known_marker_width_cm: 15.0,
            focal_length_px: 650.0,
            alignment_tolerance_px: 50,
        }
    }
}

impl GeometryEstimator {
    pub fn new(known_marker_width_cm: f32, focal_length_px: f32, alignment_tolerance_px: i32) -> Self {
        Self {
            known_marker_width_cm,
            focal_length_px,
            alignment_tolerance_px,
        }
    }

    /// Estimate distance and alignment.
    ///
    /// Rejects non-positive (or NaN) pixel widths with
    /// [`Error::InvalidPixelWidth`] instead of returning an infinite or
    /// negative distance.
    pub fn estimate(
        &self,
        frame_center: PixelPoint,
        marker_center: PixelPoint,
        marker_pixel_width: f32,
    ) -> Result<Guidance> {
        Ok(Guidance {
            distance_cm: self.distance_cm(marker_pixel_width)?,
            alignment: self.alignment(frame_center, marker_center),
        })
    }

    pub fn distance_cm(&self, marker_pixel_width: f32) -> Result<f32> {
        if !(marker_pixel_width > 0.0) {
            return Err(Error::InvalidPixelWidth(marker_pixel_width));
        }
        Ok((self.known_marker_width_cm * self.focal_length_px) / marker_pixel_width)
    }

    pub fn alignment(&self, frame_center: PixelPoint, marker_center: PixelPoint) -> Alignment {
        let dx = marker_center.x - frame_center.x;
        if dx.abs() < self.alignment_tolerance_px {
            Alignment::Aligned
        } else if dx > 0 {
            Alignment::MoveRight
        } else {
            Alignment::MoveLeft
        }
    }
}
