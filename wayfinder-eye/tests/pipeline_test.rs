//! Segmentation -> localization -> guidance on synthetic frames

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use mockall::mock;
use mockall::predicate::eq;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};
use wayfinder_core::narration;
use wayfinder_core::{Alignment, SpeechSink};
use wayfinder_eye::{
    ColorSegmenter, GuidanceLoop, ImageSequenceSource, MarkerLocalizer, ScanConfig, ScanOutcome, ScanState,
};

mock! {
    pub Speaker {}
    impl SpeechSink for Speaker {
        fn speak(&self, text: &str);
    }
}

const BACKGROUND: Rgb<u8> = Rgb([210, 210, 210]);

fn frame_with_square(x: i32, y: i32, side: u32, color: Rgb<u8>) -> RgbImage {
    let mut frame = RgbImage::from_pixel(640, 480, BACKGROUND);
    draw_filled_rect_mut(&mut frame, Rect::at(x, y).of_size(side, side), color);
    frame
}

fn no_decode(_: &RgbImage) -> Option<String> {
    None
}

#[test]
fn test_each_marker_color_is_found() {
    let config = ScanConfig::default();
    let segmenter = ColorSegmenter::from_config(&config);
    let localizer = MarkerLocalizer::from_config(&config);

    for color in [Rgb([230, 0, 0]), Rgb([0, 230, 0]), Rgb([0, 0, 230]), Rgb([230, 0, 30])] {
        let frame = frame_with_square(250, 170, 140, color);
        let mask = segmenter.mask(&frame);
        let candidate = localizer
            .find_candidate(&frame, &mask)
            .unwrap_or_else(|| panic!("no marker found for {:?}", color));
        assert_eq!(candidate.pixel_width, 140.0);
        assert_eq!(candidate.rectified.dimensions(), (200, 200));
    }
}

#[test]
fn test_gray_frame_has_no_marker() {
    let config = ScanConfig::default();
    let frame = RgbImage::from_pixel(640, 480, BACKGROUND);
    let mask = ColorSegmenter::from_config(&config).mask(&frame);
    assert!(MarkerLocalizer::from_config(&config).find_candidate(&frame, &mask).is_none());
}

#[test]
fn test_rotated_marker_is_quadrilateral() {
    let config = ScanConfig::default();
    let mut frame = RgbImage::from_pixel(640, 480, BACKGROUND);
    let diamond = [
        Point::new(320, 140),
        Point::new(420, 240),
        Point::new(320, 340),
        Point::new(220, 240),
    ];
    draw_polygon_mut(&mut frame, &diamond, Rgb([0, 0, 230]));

    let mask = ColorSegmenter::from_config(&config).mask(&frame);
    let candidate = MarkerLocalizer::from_config(&config)
        .find_candidate(&frame, &mask)
        .expect("diamond marker");
    assert!(candidate.pixel_width > 190.0 && candidate.pixel_width < 210.0);
    let center = candidate.bounding_box.center();
    assert!((center.x - 320).abs() <= 2 && (center.y - 240).abs() <= 2);
}

#[test]
fn test_guidance_for_offset_marker() {
    // 150 px wide marker centered at x = 450
    let frame = frame_with_square(375, 165, 150, Rgb([0, 0, 230]));
    let mut speaker = MockSpeaker::new();
    speaker
        .expect_speak()
        .with(eq("Move camera to the right. 65 centimeters away. "))
        .times(1)
        .return_const(());

    let mut scan = GuidanceLoop::new(&ScanConfig::default(), &no_decode, &speaker).unwrap();
    let report = scan.process_frame(&frame, Instant::now());

    let guidance = report.guidance.expect("guidance");
    assert_eq!(guidance.alignment, Alignment::MoveRight);
    assert!((guidance.distance_cm - 65.0).abs() < 1e-3);
    // exactly at the threshold is not close enough
    assert!(!report.decode_attempted);
}

#[test]
fn test_centered_marker_is_aligned() {
    let frame = frame_with_square(260, 180, 120, Rgb([0, 230, 0]));
    let mut speaker = MockSpeaker::new();
    speaker
        .expect_speak()
        .withf(|text| text.starts_with("Aligned."))
        .times(1)
        .return_const(());

    let mut scan = GuidanceLoop::new(&ScanConfig::default(), &no_decode, &speaker).unwrap();
    let report = scan.process_frame(&frame, Instant::now());
    assert!(matches!(report.state, ScanState::FeedbackEmitted(g) if g.alignment == Alignment::Aligned));
}

#[test]
fn test_feedback_rate_limited_over_frames() {
    let frame = frame_with_square(100, 180, 120, Rgb([230, 0, 0]));
    let mut speaker = MockSpeaker::new();
    speaker
        .expect_speak()
        .withf(|text| text.starts_with("Move camera to the left."))
        .times(3)
        .return_const(());

    let mut scan = GuidanceLoop::new(&ScanConfig::default(), &no_decode, &speaker).unwrap();
    let t0 = Instant::now();
    // a frame every 250 ms for 7 s: speaks at 0 s, 3 s and 6 s
    for i in 0..28u64 {
        scan.process_frame(&frame, t0 + Duration::from_millis(i * 250));
    }
}

#[test]
fn test_full_scan_reaches_marker() {
    let mut speaker = MockSpeaker::new();
    speaker
        .expect_speak()
        .with(eq(narration::SCANNER_STARTED))
        .times(1)
        .return_const(());
    speaker
        .expect_speak()
        .withf(|text| text.contains("centimeters away"))
        .times(1)
        .return_const(());
    speaker
        .expect_speak()
        .with(eq("Location found. You are at Main Entrance"))
        .times(1)
        .return_const(());

    let decoder = |rectified: &RgbImage| {
        // the rectified marker is solid blue
        let p = rectified.get_pixel(100, 100);
        (p.0[2] > 200).then(|| "Main Entrance".to_string())
    };

    let frames = vec![
        RgbImage::from_pixel(640, 480, BACKGROUND),
        frame_with_square(200, 120, 100, Rgb([0, 0, 230])),
        frame_with_square(220, 140, 180, Rgb([0, 0, 230])),
    ];
    let mut source = ImageSequenceSource::from_frames(frames);
    let mut scan = GuidanceLoop::new(&ScanConfig::default(), &decoder, &speaker).unwrap();

    let outcome = scan.run(&mut source, &AtomicBool::new(false));
    assert_eq!(outcome, ScanOutcome::Located("Main Entrance".to_string()));
}
