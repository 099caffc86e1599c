//! Quadrilateral marker localization and perspective rectification

use crate::config::ScanConfig;
use image::{Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wayfinder_core::PixelPoint;

/// Axis-aligned box in frame coordinates; `width`/`height` count pixels inclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn from_points(points: &[PixelPoint]) -> Option<Self> {
        let min_x = points.iter().map(|p| p.x).min()?;
        let max_x = points.iter().map(|p| p.x).max()?;
        let min_y = points.iter().map(|p| p.y).min()?;
        let max_y = points.iter().map(|p| p.y).max()?;
        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}

/// One frame's marker detection.
///
/// Only meaningful when [`is_valid`](Self::is_valid): a candidate whose
/// rectified buffer is empty means nothing usable was found.
#[derive(Debug, Clone)]
pub struct MarkerCandidate {
    pub rectified: RgbImage,
    pub bounding_box: BoundingBox,
    pub pixel_width: f32,
    /// Corners in the order the polygon approximation returned them
    pub corners: [PixelPoint; 4],
    pub area: f64,
}

impl MarkerCandidate {
    pub fn is_valid(&self) -> bool {
        self.rectified.width() > 0 && self.rectified.height() > 0
    }
}

/// An external contour of the mask
#[derive(Debug, Clone)]
pub struct Blob {
    pub points: Vec<Point<i32>>,
    pub area: f64,
}

impl Blob {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        let area = polygon_area(&points);
        Self { points, area }
    }

    pub fn centroid(&self) -> (f64, f64) {
        let n = self.points.len().max(1) as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
        (sx / n, sy / n)
    }
}

/// Shoelace area of a closed polygon
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice.abs() as f64) / 2.0
}

/// Order in which blobs are tried. The first quadrilateral wins.
pub trait ContourRanking: Send + Sync {
    fn order(&self, blobs: &mut [Blob], frame_size: (u32, u32));
}

/// Most prominent blob first
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestAreaFirst;

impl ContourRanking for LargestAreaFirst {
    fn order(&self, blobs: &mut [Blob], _frame_size: (u32, u32)) {
        blobs.sort_by(|a, b| b.area.total_cmp(&a.area));
    }
}

/// Blob whose centroid is closest to the frame center first
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestToCenter;

impl ContourRanking for NearestToCenter {
    fn order(&self, blobs: &mut [Blob], frame_size: (u32, u32)) {
        let cx = frame_size.0 as f64 / 2.0;
        let cy = frame_size.1 as f64 / 2.0;
        let dist = |b: &Blob| {
            let (x, y) = b.centroid();
            (x - cx).powi(2) + (y - cy).powi(2)
        };
        blobs.sort_by(|a, b| dist(a).total_cmp(&dist(b)));
    }
}

pub struct MarkerLocalizer {
    min_area: f64,
    epsilon_ratio: f64,
    rectified_size: u32,
    ranking: Box<dyn ContourRanking>,
}

impl MarkerLocalizer {
    pub fn new(min_area: f64, epsilon_ratio: f64, rectified_size: u32) -> Self {
        Self {
            min_area,
            epsilon_ratio,
            rectified_size,
            ranking: Box::new(LargestAreaFirst),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            config.min_contour_area,
            config.polygon_epsilon_ratio,
            config.rectified_size,
        )
    }

    pub fn with_ranking(mut self, ranking: Box<dyn ContourRanking>) -> Self {
        self.ranking = ranking;
        self
    }

    /// External contours of a binary mask (non-zero is foreground)
    pub fn blobs(mask: &image::GrayImage) -> Vec<Blob> {
        find_contours::<i32>(mask)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| Blob::new(c.points))
            .collect()
    }

    /// Greedy search: the first ranked blob above the area floor that
    /// approximates to four vertices becomes the candidate.
    pub fn find_candidate(&self, frame: &RgbImage, mask: &image::GrayImage) -> Option<MarkerCandidate> {
        let mut blobs = Self::blobs(mask);
        self.ranking.order(&mut blobs, frame.dimensions());

        for blob in &blobs {
            if blob.area < self.min_area {
                continue;
            }
            let perimeter = arc_length(&blob.points, true);
            if perimeter <= 0.0 {
                continue;
            }
            let approx = approximate_polygon_dp(&blob.points, self.epsilon_ratio * perimeter, true);
            if approx.len() != 4 {
                continue;
            }

            let corners = [0, 1, 2, 3].map(|i| PixelPoint::new(approx[i].x, approx[i].y));
            debug!("quadrilateral found: area {:.0}, corners {:?}", blob.area, corners);
            return Some(self.rectify(frame, corners, blob.area));
        }
        None
    }

    /// Warp the quadrilateral onto a `rectified_size` square. Corners map to
    /// the square's corners in detection order.
    pub fn rectify(&self, frame: &RgbImage, corners: [PixelPoint; 4], area: f64) -> MarkerCandidate {
        let bounding_box = BoundingBox::from_points(&corners).unwrap_or(BoundingBox {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        });

        let side = self.rectified_size as f32;
        let from = corners.map(|p| (p.x as f32, p.y as f32));
        let to = [(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)];

        let rectified = match Projection::from_control_points(from, to) {
            Some(projection) => {
                let mut out = RgbImage::new(self.rectified_size, self.rectified_size);
                warp_into(frame, &projection, Interpolation::Bilinear, Rgb([0, 0, 0]), &mut out);
                out
            }
            None => {
                debug!("degenerate quadrilateral {:?}, no rectification", corners);
                RgbImage::new(0, 0)
            }
        };

        MarkerCandidate {
            rectified,
            bounding_box,
            pixel_width: bounding_box.width as f32,
            corners,
            area,
        }
    }
}

impl Default for MarkerLocalizer {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn mask_with(rects: &[(i32, i32, u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(640, 480);
        for &(x, y, w, h) in rects {
            draw_filled_rect_mut(&mut mask, Rect::at(x, y).of_size(w, h), Luma([255]));
        }
        mask
    }

    #[test]
    fn test_polygon_area() {
        let square = vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10), Point::new(0, 10)];
        assert_eq!(polygon_area(&square), 100.0);
        assert_eq!(polygon_area(&square[..2]), 0.0);
    }

    #[test]
    fn test_bounding_box_center() {
        let bbox = BoundingBox::from_points(&[
            PixelPoint::new(10, 20),
            PixelPoint::new(109, 20),
            PixelPoint::new(109, 119),
            PixelPoint::new(10, 119),
        ])
        .unwrap();
        assert_eq!(bbox.width, 100);
        assert_eq!(bbox.height, 100);
        assert_eq!(bbox.center(), PixelPoint::new(60, 70));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_finds_square() {
        let frame = RgbImage::new(640, 480);
        let mask = mask_with(&[(200, 150, 120, 120)]);
        let candidate = MarkerLocalizer::default().find_candidate(&frame, &mask).unwrap();

        assert!(candidate.is_valid());
        assert_eq!(candidate.rectified.dimensions(), (200, 200));
        assert_eq!(candidate.bounding_box.x, 200);
        assert_eq!(candidate.bounding_box.y, 150);
        assert_eq!(candidate.pixel_width, 120.0);
    }

    #[test]
    fn test_small_blob_rejected() {
        let frame = RgbImage::new(640, 480);
        let mask = mask_with(&[(10, 10, 20, 20)]);
        assert!(MarkerLocalizer::default().find_candidate(&frame, &mask).is_none());
    }

    #[test]
    fn test_empty_mask() {
        let frame = RgbImage::new(640, 480);
        let mask = GrayImage::new(640, 480);
        assert!(MarkerLocalizer::default().find_candidate(&frame, &mask).is_none());
    }

    #[test]
    fn test_largest_blob_wins() {
        let frame = RgbImage::new(640, 480);
        let mask = mask_with(&[(20, 20, 60, 60), (300, 200, 160, 160)]);
        let candidate = MarkerLocalizer::default().find_candidate(&frame, &mask).unwrap();
        assert_eq!(candidate.bounding_box.x, 300);
        assert_eq!(candidate.pixel_width, 160.0);
    }

    #[test]
    fn test_nearest_to_center_ranking() {
        let frame = RgbImage::new(640, 480);
        // Large blob in a corner, smaller one centered
        let mask = mask_with(&[(0, 0, 150, 150), (280, 200, 80, 80)]);
        let localizer = MarkerLocalizer::default().with_ranking(Box::new(NearestToCenter));
        let candidate = localizer.find_candidate(&frame, &mask).unwrap();
        assert_eq!(candidate.bounding_box.x, 280);
    }

    #[test]
    fn test_rectify_samples_marker_interior() {
        let mut frame = RgbImage::from_pixel(640, 480, Rgb([10, 10, 10]));
        draw_filled_rect_mut(&mut frame, Rect::at(100, 100).of_size(200, 200), Rgb([0, 0, 250]));
        let localizer = MarkerLocalizer::default();
        let corners = [
            PixelPoint::new(100, 100),
            PixelPoint::new(299, 100),
            PixelPoint::new(299, 299),
            PixelPoint::new(100, 299),
        ];
        let candidate = localizer.rectify(&frame, corners, 200.0 * 200.0);
        assert!(candidate.is_valid());
        assert_eq!(candidate.pixel_width, 200.0);
        let center = candidate.rectified.get_pixel(100, 100);
        assert!(center.0[2] > 240 && center.0[0] < 10, "{:?}", center);
    }

    #[test]
    fn test_empty_rectification_is_invalid() {
        let candidate = MarkerCandidate {
            rectified: RgbImage::new(0, 0),
            bounding_box: BoundingBox { x: 0, y: 0, width: 180, height: 180 },
            pixel_width: 180.0,
            corners: [PixelPoint::new(0, 0); 4],
            area: 0.0,
        };
        assert!(!candidate.is_valid());
    }
}
