//! Marker payload decoding
//!
//! The decoder is a black box: rectified image in, optional location text out.

use image::RgbImage;

pub trait MarkerDecoder {
    /// `None` when nothing could be read (blurry, too far, not a marker).
    fn decode(&self, rectified: &RgbImage) -> Option<String>;
}

impl<F> MarkerDecoder for F
where
    F: Fn(&RgbImage) -> Option<String>,
{
    fn decode(&self, rectified: &RgbImage) -> Option<String> {
        self(rectified)
    }
}

/// Normalize a raw payload: surrounding whitespace is dropped and an empty
/// payload counts as a failed decode.
pub fn normalize_payload(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(feature = "opencv")]
pub use qr::QrCodeDecoder;

#[cfg(feature = "opencv")]
mod qr {
    use super::{normalize_payload, MarkerDecoder};
    use crate::camera::rgb_to_mat;
    use crate::error::VisionError;
    use image::RgbImage;
    use opencv::core::Mat;
    use opencv::objdetect::QRCodeDetector;
    use opencv::prelude::*;
    use parking_lot::Mutex;
    use tracing::{debug, warn};

    /// OpenCV QR code reader
    pub struct QrCodeDecoder {
        detector: Mutex<QRCodeDetector>,
    }

    impl QrCodeDecoder {
        pub fn new() -> Result<Self, VisionError> {
            Ok(Self {
                detector: Mutex::new(QRCodeDetector::default()?),
            })
        }

        fn try_decode(&self, rectified: &RgbImage) -> Result<Option<String>, VisionError> {
            let bgr = rgb_to_mat(rectified)?;
            let mut points = Mat::default();
            let mut straight = Mat::default();
            let detector = self.detector.lock();
            let payload = detector.detect_and_decode(&bgr, &mut points, &mut straight)?;
            Ok(normalize_payload(&String::from_utf8_lossy(&payload)))
        }
    }

    impl MarkerDecoder for QrCodeDecoder {
        fn decode(&self, rectified: &RgbImage) -> Option<String> {
            match self.try_decode(rectified) {
                Ok(result) => {
                    debug!("QR decode: {:?}", result);
                    result
                }
                Err(e) => {
                    warn!("QR decoder failed: {}", e);
                    None
                }
            }
        }
    }
}
