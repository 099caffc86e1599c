use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::time::Instant;
use wayfinder_core::SpeechSink;
use wayfinder_eye::{ColorSegmenter, GuidanceLoop, MarkerLocalizer, ScanConfig};

struct Silent;

impl SpeechSink for Silent {
    fn speak(&self, _text: &str) {}
}

fn marker_frame() -> RgbImage {
    let mut frame = RgbImage::from_pixel(640, 480, Rgb([200, 200, 200]));
    draw_filled_rect_mut(&mut frame, Rect::at(260, 180).of_size(120, 120), Rgb([0, 0, 230]));
    frame
}

fn bench_segmentation(c: &mut Criterion) {
    let segmenter = ColorSegmenter::from_config(&ScanConfig::default());
    let frame = marker_frame();

    c.bench_function("segment_640x480", |b| b.iter(|| segmenter.mask(black_box(&frame))));
}

fn bench_localization(c: &mut Criterion) {
    let config = ScanConfig::default();
    let frame = marker_frame();
    let mask = ColorSegmenter::from_config(&config).mask(&frame);
    let localizer = MarkerLocalizer::from_config(&config);

    c.bench_function("localize_single_marker", |b| {
        b.iter(|| localizer.find_candidate(black_box(&frame), black_box(&mask)))
    });
}

fn bench_guidance_frame(c: &mut Criterion) {
    let config = ScanConfig::default();
    let frame = marker_frame();
    let decoder = |_: &RgbImage| -> Option<String> { None };
    let mut scan = GuidanceLoop::new(&config, &decoder, &Silent).unwrap();

    c.bench_function("guidance_frame", |b| {
        b.iter(|| scan.process_frame(black_box(&frame), Instant::now()))
    });
}

criterion_group!(benches, bench_segmentation, bench_localization, bench_guidance_frame);
criterion_main!(benches);
