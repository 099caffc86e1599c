//! Color segmentation of marker candidates

use crate::config::{HsvRange, ScanConfig};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::equalize_histogram;
use imageproc::distance_transform::euclidean_squared_distance_transform;
use tracing::debug;

pub const MASK_ON: u8 = 255;

/// RGB to HSV in OpenCV's 8-bit convention: H is degrees / 2 (0..=179),
/// S and V are scaled to 0..=255.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f32;
    let g = rgb[1] as f32;
    let b = rgb[2] as f32;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let h = ((h / 2.0).round() as u32 % 180) as u8;
    [h, s.round() as u8, max as u8]
}

/// Morphological closing with a disk of `radius`: dilate, then erode.
///
/// Pixels outside the image never count as background, so nothing erodes
/// inward from the frame border.
pub fn close_disk(mask: &GrayImage, radius: u8) -> GrayImage {
    let r2 = f64::from(radius) * f64::from(radius);

    let to_on = euclidean_squared_distance_transform(mask);
    let dilated = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if to_on.get_pixel(x, y).0[0] <= r2 { MASK_ON } else { 0 }])
    });

    let gaps = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if dilated.get_pixel(x, y).0[0] == 0 { MASK_ON } else { 0 }])
    });
    let to_off = euclidean_squared_distance_transform(&gaps);
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if to_off.get_pixel(x, y).0[0] > r2 { MASK_ON } else { 0 }])
    })
}

/// Builds a binary mask of pixels falling into any configured color band.
#[derive(Debug, Clone)]
pub struct ColorSegmenter {
    bands: Vec<HsvRange>,
    equalize_value: bool,
    closing_radius: u8,
}

impl ColorSegmenter {
    pub fn new(bands: Vec<HsvRange>, equalize_value: bool, closing_radius: u8) -> Self {
        Self {
            bands,
            equalize_value,
            closing_radius,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            config.color_bands.clone(),
            config.equalize_value,
            config.closing_radius,
        )
    }

    pub fn bands(&self) -> &[HsvRange] {
        &self.bands
    }

    /// 255 where a pixel matches any band, 0 elsewhere, after closing.
    pub fn mask(&self, frame: &RgbImage) -> GrayImage {
        let (width, height) = frame.dimensions();
        let hsv: Vec<[u8; 3]> = frame.pixels().map(|p| rgb_to_hsv(p.0)).collect();

        // Lighting normalization: equalize V, keep H and S
        let value: Vec<u8> = if self.equalize_value {
            let v_plane = GrayImage::from_fn(width, height, |x, y| {
                Luma([hsv[(y * width + x) as usize][2]])
            });
            equalize_histogram(&v_plane).into_raw()
        } else {
            hsv.iter().map(|p| p[2]).collect()
        };

        let mut mask = GrayImage::new(width, height);
        for (i, pixel) in mask.pixels_mut().enumerate() {
            let sample = [hsv[i][0], hsv[i][1], value[i]];
            if self.bands.iter().any(|band| band.contains(sample)) {
                pixel.0[0] = MASK_ON;
            }
        }

        if self.closing_radius > 0 {
            mask = close_disk(&mask, self.closing_radius);
        }

        debug!(
            "mask {}x{}: {} px on",
            width,
            height,
            mask.pixels().filter(|p| p.0[0] == MASK_ON).count()
        );
        mask
    }
}
