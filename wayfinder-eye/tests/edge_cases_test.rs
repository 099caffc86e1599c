//! Shapes and frames the localizer must not mistake for markers

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use wayfinder_eye::{ColorSegmenter, HsvRange, MarkerLocalizer, ScanConfig, VisionError};

fn blank_mask() -> GrayImage {
    GrayImage::new(640, 480)
}

#[test]
fn test_triangle_rejected() {
    let frame = RgbImage::new(640, 480);
    let mut mask = blank_mask();
    draw_polygon_mut(
        &mut mask,
        &[Point::new(320, 100), Point::new(470, 380), Point::new(170, 380)],
        Luma([255]),
    );
    assert!(MarkerLocalizer::default().find_candidate(&frame, &mask).is_none());
}

#[test]
fn test_l_shape_rejected() {
    let frame = RgbImage::new(640, 480);
    let mut mask = blank_mask();
    draw_filled_rect_mut(&mut mask, Rect::at(100, 100).of_size(80, 240), Luma([255]));
    draw_filled_rect_mut(&mut mask, Rect::at(100, 260).of_size(240, 80), Luma([255]));
    assert!(MarkerLocalizer::default().find_candidate(&frame, &mask).is_none());
}

#[test]
fn test_square_found_behind_larger_non_quad() {
    let frame = RgbImage::new(640, 480);
    let mut mask = blank_mask();
    draw_filled_rect_mut(&mut mask, Rect::at(20, 20).of_size(80, 240), Luma([255]));
    draw_filled_rect_mut(&mut mask, Rect::at(20, 180).of_size(240, 80), Luma([255]));
    draw_filled_rect_mut(&mut mask, Rect::at(450, 300).of_size(60, 60), Luma([255]));

    let candidate = MarkerLocalizer::default()
        .find_candidate(&frame, &mask)
        .expect("square behind the L shape");
    assert_eq!(candidate.bounding_box.x, 450);
    assert_eq!(candidate.pixel_width, 60.0);
}

#[test]
fn test_area_floor_is_configurable() {
    let frame = RgbImage::new(640, 480);
    let mut mask = blank_mask();
    draw_filled_rect_mut(&mut mask, Rect::at(300, 200).of_size(40, 40), Luma([255]));

    assert!(MarkerLocalizer::default().find_candidate(&frame, &mask).is_some());

    let mut config = ScanConfig::default();
    config.min_contour_area = 2000.0;
    assert!(MarkerLocalizer::from_config(&config).find_candidate(&frame, &mask).is_none());
}

#[test]
fn test_hollow_outline_uses_outer_border() {
    let frame = RgbImage::new(640, 480);
    let mut mask = blank_mask();
    draw_filled_rect_mut(&mut mask, Rect::at(200, 150).of_size(160, 160), Luma([255]));
    draw_filled_rect_mut(&mut mask, Rect::at(220, 170).of_size(120, 120), Luma([0]));

    let blobs = MarkerLocalizer::blobs(&mask);
    assert_eq!(blobs.len(), 1);
    let candidate = MarkerLocalizer::default().find_candidate(&frame, &mask).unwrap();
    assert_eq!(candidate.pixel_width, 160.0);
}

#[test]
fn test_unlisted_color_ignored() {
    let mut frame = RgbImage::from_pixel(640, 480, Rgb([200, 200, 200]));
    // yellow: hue 30, outside every default band
    draw_filled_rect_mut(&mut frame, Rect::at(200, 150).of_size(150, 150), Rgb([230, 230, 0]));
    let config = ScanConfig::default();
    let mask = ColorSegmenter::from_config(&config).mask(&frame);
    assert!(MarkerLocalizer::from_config(&config).find_candidate(&frame, &mask).is_none());

    let mut config = ScanConfig::default();
    config.color_bands = vec![HsvRange::new("yellow", [20, 100, 50], [35, 255, 255])];
    let mask = ColorSegmenter::from_config(&config).mask(&frame);
    assert!(MarkerLocalizer::from_config(&config).find_candidate(&frame, &mask).is_some());
}

#[test]
fn test_tiny_frame() {
    let frame = RgbImage::from_pixel(3, 3, Rgb([0, 0, 230]));
    let config = ScanConfig::default();
    let mask = ColorSegmenter::from_config(&config).mask(&frame);
    assert!(MarkerLocalizer::from_config(&config).find_candidate(&frame, &mask).is_none());
}

#[test]
fn test_config_from_json_overrides() {
    let config: ScanConfig = serde_json::from_str(
        r#"{
            "proximity_threshold_px": 120.0,
            "color_bands": [{"name": "blue", "lower": [100, 150, 50], "upper": [140, 255, 255]}]
        }"#,
    )
    .unwrap();
    assert_eq!(config.proximity_threshold_px, 120.0);
    assert_eq!(config.color_bands.len(), 1);
    assert_eq!(config.feedback_interval_ms, 3_000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_vision_error_converts_to_core() {
    let err: wayfinder_core::Error = VisionError::Camera("device 3 busy".to_string()).into();
    assert!(err.to_string().contains("device 3 busy"));

    let core = wayfinder_core::Error::NodeNotFound("N099".to_string());
    let roundtrip: wayfinder_core::Error = VisionError::Core(core).into();
    assert!(matches!(roundtrip, wayfinder_core::Error::NodeNotFound(name) if name == "N099"));
}
