//! wayfinder-eye: Marker localization and scanning guidance
//!
//! Finds colored quadrilateral markers in camera frames, rectifies them for
//! decoding and drives the per-frame guidance loop that tells the user how to
//! pan the camera until a marker is close enough to read.

pub mod camera;
pub mod config;
pub mod decoder;
pub mod error;
pub mod guidance;
pub mod localizer;
pub mod overlay;
pub mod segmentation;

pub use camera::{FrameSource, ImageSequenceSource};
pub use config::{HsvRange, ScanConfig};
pub use decoder::MarkerDecoder;
pub use error::VisionError;
pub use guidance::{FrameReport, FrameSink, GuidanceLoop, ScanOutcome, ScanState};
pub use overlay::{annotate_scan_frame, draw_labels, draw_route, render_route_file, route_labels, scan_caption, FrameRecorder, Label};
pub use localizer::{BoundingBox, ContourRanking, LargestAreaFirst, MarkerCandidate, MarkerLocalizer, NearestToCenter};
pub use segmentation::ColorSegmenter;
