//! Scan a marker, plan a route from it and draw the result

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use wayfinder_core::narration;
use wayfinder_core::{Navigator, SpeechSink, Topology};
use wayfinder_eye::{draw_route, GuidanceLoop, ImageSequenceSource, ScanConfig, ScanOutcome};

#[derive(Default)]
struct Transcript {
    lines: Mutex<Vec<String>>,
}

impl SpeechSink for Transcript {
    fn speak(&self, text: &str) {
        self.lines.lock().push(text.to_string());
    }
}

impl Transcript {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

fn marker_frame(x: i32, y: i32, side: u32) -> RgbImage {
    let mut frame = RgbImage::from_pixel(640, 480, Rgb([200, 200, 200]));
    draw_filled_rect_mut(&mut frame, Rect::at(x, y).of_size(side, side), Rgb([0, 0, 230]));
    frame
}

fn solid_blue(rectified: &RgbImage) -> Option<String> {
    let p = rectified.get_pixel(rectified.width() / 2, rectified.height() / 2);
    (p.0[2] > 200 && p.0[0] < 50).then(|| "N004".to_string())
}

#[test]
fn test_scan_then_navigate() {
    let transcript = Arc::new(Transcript::default());

    let frames = vec![
        RgbImage::from_pixel(640, 480, Rgb([200, 200, 200])),
        marker_frame(40, 150, 110),
        marker_frame(200, 120, 220),
    ];
    let mut source = ImageSequenceSource::from_frames(frames);
    let config = ScanConfig::default();
    let mut scan = GuidanceLoop::new(&config, &solid_blue, transcript.as_ref()).unwrap();
    let outcome = scan.run(&mut source, &AtomicBool::new(false));
    assert_eq!(outcome.location(), Some("N004"));

    let navigator = Navigator::new(&Topology::builtin_floor(), transcript.clone()).unwrap();
    let plan = navigator.plan("N004", "N011").unwrap();
    assert!(plan.is_navigable());
    assert_eq!(plan.path.start(), Some("N004"));
    assert_eq!(plan.path.destination(), Some("N011"));

    let lines = transcript.lines();
    assert_eq!(lines[0], narration::SCANNER_STARTED);
    assert!(lines[1].starts_with("Move camera to the left."));
    assert!(lines.contains(&"Location found. You are at N004".to_string()));
    assert!(lines.contains(&"Your destination is N011".to_string()));
    let spoken_route = lines.last().unwrap();
    assert!(spoken_route.starts_with("To get to your destination, N011. "));
    assert_eq!(Some(spoken_route), plan.narration.as_ref());
}

#[test]
fn test_cancelled_scan_skips_planning() {
    let transcript = Transcript::default();
    let frames = vec![RgbImage::from_pixel(640, 480, Rgb([200, 200, 200])); 3];
    let mut source = ImageSequenceSource::from_frames(frames);
    let config = ScanConfig::default();
    let mut scan = GuidanceLoop::new(&config, &solid_blue, &transcript).unwrap();

    let outcome = scan.run(&mut source, &AtomicBool::new(true));
    assert_eq!(outcome, ScanOutcome::Cancelled);
    assert_eq!(outcome.location(), None);
    assert_eq!(transcript.lines(), [narration::SCANNER_STARTED, narration::SCAN_CANCELLED]);
}

#[test]
fn test_custom_topology_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
destinations = ["Lab", "Library"]

[[nodes]]
name = "Lobby"
position = {{ x = 20, y = 20 }}

[[nodes]]
name = "Hall"
position = {{ x = 120, y = 20 }}

[[nodes]]
name = "Lab"
position = {{ x = 120, y = 120 }}

[[nodes]]
name = "Library"
position = {{ x = 20, y = 120 }}

[[edges]]
from = "Lobby"
to = "Hall"
weight = 4

[[edges]]
from = "Hall"
to = "Lab"
weight = 4

[[edges]]
from = "Lobby"
to = "Lab"
weight = 12

[[edges]]
from = "Lobby"
to = "Library"
weight = 3
"#
    )
    .unwrap();

    let topology = Topology::from_file(file.path()).unwrap();
    let transcript = Arc::new(Transcript::default());
    let navigator = Navigator::new(&topology, transcript.clone()).unwrap();
    assert_eq!(navigator.destinations(), ["Lab", "Library"]);

    let plan = navigator.plan("Library", "Lab").unwrap();
    assert_eq!(plan.path.nodes(), ["Library", "Lobby", "Hall", "Lab"]);
    assert_eq!(plan.path.cost(), 11);
    assert_eq!(
        plan.narration.as_deref(),
        Some(
            "To get to your destination, Lab. You will need to pass by Lobby, then Hall, before arriving at your final destination."
        )
    );

    let mut map = RgbImage::from_pixel(160, 160, Rgb([255, 255, 255]));
    draw_route(&mut map, &plan.path, navigator.coordinates()).unwrap();
    // the corridor between Lobby and Hall is painted
    assert_ne!(*map.get_pixel(70, 20), Rgb([255, 255, 255]));
    // nothing drawn away from the route
    assert_eq!(*map.get_pixel(150, 150), Rgb([255, 255, 255]));
}
