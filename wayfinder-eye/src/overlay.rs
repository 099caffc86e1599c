//! Drawing: scan frame annotations and route maps

use crate::error::VisionError;
use crate::guidance::{FrameReport, FrameSink, ScanState};
use crate::localizer::BoundingBox;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use wayfinder_core::{CoordinateMap, Error as CoreError, PixelPoint, RoutePath};

const GUIDE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const DECODE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const ROUTE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const START_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const END_COLOR: Rgb<u8> = Rgb([220, 0, 0]);

const ROUTE_THICKNESS: i32 = 2;
const NODE_RADIUS: i32 = 6;
const LABEL_OFFSET: i32 = 10;

/// A line of text anchored at its bottom-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub origin: PixelPoint,
    pub color: Rgb<u8>,
}

/// "You are here" and "Destination" captions beside the route endpoints
pub fn route_labels(path: &RoutePath, coordinates: &CoordinateMap) -> Vec<Label> {
    let mut labels = Vec::new();
    let endpoints = [
        (path.start(), "You are here", START_COLOR),
        (path.destination(), "Destination", END_COLOR),
    ];
    for (node, caption, color) in endpoints {
        if let Some((name, at)) = node.and_then(|n| coordinates.get(n).map(|p| (n, p))) {
            labels.push(Label {
                text: format!("{}: {}", caption, name),
                origin: PixelPoint::new(at.x + LABEL_OFFSET, at.y - LABEL_OFFSET),
                color,
            });
        }
    }
    labels
}

/// The spoken feedback for this frame, shown in the top-left corner
pub fn scan_caption(report: &FrameReport) -> Option<Label> {
    let text = match &report.state {
        ScanState::MarkerReached(location) => format!("Location: {}", location),
        _ => report.guidance?.to_string().trim_end().to_string(),
    };
    Some(Label {
        text,
        origin: PixelPoint::new(LABEL_OFFSET, 2 * LABEL_OFFSET),
        color: GUIDE_COLOR,
    })
}

/// Render labels with OpenCV's built-in Hershey font
#[cfg(feature = "opencv")]
pub fn draw_labels(image: &mut RgbImage, labels: &[Label]) -> Result<(), VisionError> {
    use crate::camera::{mat_to_rgb, rgb_to_mat};
    use opencv::{core, imgproc};

    if labels.is_empty() {
        return Ok(());
    }
    let mut canvas = rgb_to_mat(image)?;
    for label in labels {
        let [r, g, b] = label.color.0;
        imgproc::put_text(
            &mut canvas,
            &label.text,
            core::Point::new(label.origin.x, label.origin.y),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.6,
            core::Scalar::new(b as f64, g as f64, r as f64, 0.0),
            2,
            imgproc::LINE_8,
            false,
        )?;
    }
    *image = mat_to_rgb(&canvas)?;
    Ok(())
}

/// Without OpenCV there is no font to render with; labels are only logged.
#[cfg(not(feature = "opencv"))]
pub fn draw_labels(_image: &mut RgbImage, labels: &[Label]) -> Result<(), VisionError> {
    for label in labels {
        debug!("label at ({}, {}): {}", label.origin.x, label.origin.y, label.text);
    }
    Ok(())
}

/// Box of side `size` centered in the frame; the operator lines the marker up with it.
pub fn draw_alignment_guide(frame: &mut RgbImage, size: u32) {
    let size = size.min(frame.width()).min(frame.height());
    if size == 0 {
        return;
    }
    let x = ((frame.width() - size) / 2) as i32;
    let y = ((frame.height() - size) / 2) as i32;
    draw_hollow_rect_mut(frame, Rect::at(x, y).of_size(size, size), GUIDE_COLOR);
}

/// Outline a detected marker
pub fn draw_marker_box(frame: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
    if bbox.width == 0 || bbox.height == 0 {
        return;
    }
    draw_hollow_rect_mut(frame, Rect::at(bbox.x, bbox.y).of_size(bbox.width, bbox.height), color);
}

/// Copy of `frame` with the guide box and, when present, the marker outline.
/// The outline turns yellow once the marker is close enough to decode.
pub fn annotate_scan_frame(frame: &RgbImage, report: &FrameReport, guide_box_size: u32) -> RgbImage {
    let mut out = frame.clone();
    draw_alignment_guide(&mut out, guide_box_size);
    if let Some(bbox) = &report.marker_box {
        let color = if report.decode_attempted { DECODE_COLOR } else { MARKER_COLOR };
        draw_marker_box(&mut out, bbox, color);
    }
    if let Some(caption) = scan_caption(report) {
        if let Err(e) = draw_labels(&mut out, &[caption]) {
            warn!("Failed to caption scan frame: {}", e);
        }
    }
    out
}

fn thick_segment(map: &mut RgbImage, from: (f32, f32), to: (f32, f32)) {
    for offset in -(ROUTE_THICKNESS / 2)..=(ROUTE_THICKNESS / 2) {
        let o = offset as f32;
        draw_line_segment_mut(map, (from.0 + o, from.1), (to.0 + o, to.1), ROUTE_COLOR);
        draw_line_segment_mut(map, (from.0, from.1 + o), (to.0, to.1 + o), ROUTE_COLOR);
    }
}

/// Draw the route's legs onto a floor map, then mark and label start and
/// destination. Every node on the path needs a pixel coordinate.
pub fn draw_route(map: &mut RgbImage, path: &RoutePath, coordinates: &CoordinateMap) -> Result<(), VisionError> {
    let points = path
        .nodes()
        .iter()
        .map(|name| {
            coordinates
                .get(name)
                .copied()
                .ok_or_else(|| VisionError::Core(CoreError::NodeNotFound(name.clone())))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for pair in points.windows(2) {
        thick_segment(
            map,
            (pair[0].x as f32, pair[0].y as f32),
            (pair[1].x as f32, pair[1].y as f32),
        );
    }

    if let (Some(start), Some(end)) = (points.first(), points.last()) {
        draw_filled_circle_mut(map, (start.x, start.y), NODE_RADIUS, START_COLOR);
        draw_filled_circle_mut(map, (end.x, end.y), NODE_RADIUS, END_COLOR);
    }
    draw_labels(map, &route_labels(path, coordinates))?;

    debug!("route with {} nodes drawn", points.len());
    Ok(())
}

/// Load a floor map, draw the route on it and save the result.
pub fn render_route_file(
    map_path: &Path,
    out_path: &Path,
    path: &RoutePath,
    coordinates: &CoordinateMap,
) -> Result<(), VisionError> {
    let mut map = image::open(map_path)?.to_rgb8();
    draw_route(&mut map, path, coordinates)?;
    map.save(out_path)?;
    info!("Route map written to {}", out_path.display());
    Ok(())
}

/// Writes each annotated scan frame to `dir` as a numbered PNG
pub struct FrameRecorder {
    dir: PathBuf,
    guide_box_size: u32,
    written: usize,
}

impl FrameRecorder {
    pub fn new<P: Into<PathBuf>>(dir: P, guide_box_size: u32) -> Result<Self, VisionError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            guide_box_size,
            written: 0,
        })
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for FrameRecorder {
    fn show(&mut self, frame: &RgbImage, report: &FrameReport) {
        let annotated = annotate_scan_frame(frame, report, self.guide_box_size);
        let path = self.dir.join(format!("scan_{:05}.png", self.written));
        match annotated.save(&path) {
            Ok(()) => self.written += 1,
            Err(e) => warn!("Failed to record frame {}: {}", path.display(), e),
        }
        if let ScanState::MarkerReached(location) = &report.state {
            info!("Recorded final frame for {}", location);
        }
    }
}
