//! Per-frame scanning loop: detect, guide, decode
//!
//! Each frame runs segmentation, localization and guidance estimation.
//! Spoken feedback is rate-limited by the feedback interval; a marker wider
//! than the proximity threshold is handed to the decoder and a successful
//! decode ends the scan.

use crate::camera::FrameSource;
use crate::config::ScanConfig;
use crate::decoder::MarkerDecoder;
use crate::error::VisionError;
use crate::localizer::{BoundingBox, ContourRanking, MarkerLocalizer};
use crate::segmentation::ColorSegmenter;
use image::RgbImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use wayfinder_core::narration;
use wayfinder_core::{GeometryEstimator, Guidance, PixelPoint, SpeechSink};

/// What a single frame led to
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    /// Nothing actionable this frame
    Scanning,
    /// A marker was seen and guidance was spoken
    FeedbackEmitted(Guidance),
    /// Decoded location text
    MarkerReached(String),
    Cancelled,
    CameraLost,
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanState::MarkerReached(_) | ScanState::Cancelled | ScanState::CameraLost
        )
    }
}

/// How a scan ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Located(String),
    Cancelled,
    CameraLost,
}

impl ScanOutcome {
    pub fn location(&self) -> Option<&str> {
        match self {
            ScanOutcome::Located(location) => Some(location),
            _ => None,
        }
    }

    /// Flattened form: the location, or an empty string for both failure kinds
    pub fn into_location_string(self) -> String {
        match self {
            ScanOutcome::Located(location) => location,
            ScanOutcome::Cancelled | ScanOutcome::CameraLost => String::new(),
        }
    }
}

/// Per-frame result, also handed to the display sink
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub state: ScanState,
    pub marker_box: Option<BoundingBox>,
    pub guidance: Option<Guidance>,
    pub decode_attempted: bool,
}

impl FrameReport {
    fn idle() -> Self {
        Self {
            state: ScanState::Scanning,
            marker_box: None,
            guidance: None,
            decode_attempted: false,
        }
    }
}

/// Receives every processed frame, e.g. for on-screen display
pub trait FrameSink {
    fn show(&mut self, frame: &RgbImage, report: &FrameReport);
}

pub struct GuidanceLoop<'a> {
    segmenter: ColorSegmenter,
    localizer: MarkerLocalizer,
    estimator: GeometryEstimator,
    proximity_threshold_px: f32,
    feedback_interval: Duration,
    decoder: &'a dyn MarkerDecoder,
    speech: &'a dyn SpeechSink,
    display: Option<&'a mut dyn FrameSink>,
    last_feedback: Option<Instant>,
}

impl<'a> GuidanceLoop<'a> {
    pub fn new(
        config: &ScanConfig,
        decoder: &'a dyn MarkerDecoder,
        speech: &'a dyn SpeechSink,
    ) -> Result<Self, VisionError> {
        config.validate().map_err(VisionError::Config)?;
        Ok(Self {
            segmenter: ColorSegmenter::from_config(config),
            localizer: MarkerLocalizer::from_config(config),
            estimator: config.estimator(),
            proximity_threshold_px: config.proximity_threshold_px,
            feedback_interval: config.feedback_interval(),
            decoder,
            speech,
            display: None,
            last_feedback: None,
        })
    }

    pub fn with_ranking(mut self, ranking: Box<dyn ContourRanking>) -> Self {
        self.localizer = self.localizer.with_ranking(ranking);
        self
    }

    pub fn with_display(mut self, display: &'a mut dyn FrameSink) -> Self {
        self.display = Some(display);
        self
    }

    /// Run one frame of the protocol at time `now`.
    pub fn process_frame(&mut self, frame: &RgbImage, now: Instant) -> FrameReport {
        let mask = self.segmenter.mask(frame);
        let candidate = match self.localizer.find_candidate(frame, &mask) {
            Some(c) if c.is_valid() => c,
            _ => return FrameReport::idle(),
        };

        let mut report = FrameReport {
            marker_box: Some(candidate.bounding_box),
            ..FrameReport::idle()
        };

        let frame_center = PixelPoint::new((frame.width() / 2) as i32, (frame.height() / 2) as i32);
        match self
            .estimator
            .estimate(frame_center, candidate.bounding_box.center(), candidate.pixel_width)
        {
            Ok(guidance) => {
                report.guidance = Some(guidance);
                let due = self
                    .last_feedback
                    .map_or(true, |last| now.saturating_duration_since(last) >= self.feedback_interval);
                if due {
                    self.speech.speak(&guidance.to_string());
                    self.last_feedback = Some(now);
                    report.state = ScanState::FeedbackEmitted(guidance);
                }
            }
            Err(e) => debug!("no guidance this frame: {}", e),
        }

        if candidate.pixel_width > self.proximity_threshold_px {
            report.decode_attempted = true;
            match self.decoder.decode(&candidate.rectified) {
                Some(location) if !location.is_empty() => {
                    info!("Marker decoded: {}", location);
                    self.speech.speak(&narration::location_found(&location));
                    report.state = ScanState::MarkerReached(location);
                }
                _ => debug!("marker close enough but not decodable"),
            }
        }

        report
    }

    /// Scan until a marker is decoded, the feed ends, or `cancel` is set.
    /// Cancellation is checked once per frame, after the frame is processed.
    pub fn run(&mut self, source: &mut dyn FrameSource, cancel: &AtomicBool) -> ScanOutcome {
        info!("Scanner started");
        self.speech.speak(narration::SCANNER_STARTED);

        loop {
            let frame = match source.next_frame() {
                Some(frame) if frame.width() > 0 && frame.height() > 0 => frame,
                _ => {
                    warn!("Camera feed lost");
                    self.speech.speak(narration::CAMERA_LOST);
                    return ScanOutcome::CameraLost;
                }
            };

            let report = self.process_frame(&frame, Instant::now());
            if let Some(display) = self.display.as_mut() {
                display.show(&frame, &report);
            }

            if let ScanState::MarkerReached(location) = report.state {
                return ScanOutcome::Located(location);
            }

            if cancel.load(Ordering::Relaxed) {
                info!("Scan cancelled by user");
                self.speech.speak(narration::SCAN_CANCELLED);
                return ScanOutcome::Cancelled;
            }
        }
    }
}
