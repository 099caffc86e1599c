//! Frame sources: USB webcam capture and recorded frame replay

use crate::error::VisionError;
use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Pull-based frame producer. `None` means the feed is gone.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<RgbImage>;
}

enum Pending {
    Decoded(RgbImage),
    File(PathBuf),
}

/// Replays frames from memory or from image files in a directory
/// (sorted by file name). Runs dry like a disconnected camera.
pub struct ImageSequenceSource {
    frames: VecDeque<Pending>,
}

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

impl ImageSequenceSource {
    pub fn from_frames<I: IntoIterator<Item = RgbImage>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().map(Pending::Decoded).collect(),
        }
    }

    /// Frames are decoded lazily, one per `next_frame` call.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, VisionError> {
        let dir = dir.as_ref();
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(VisionError::Camera(format!("No frames found in {}", dir.display())));
        }
        info!("Replaying {} frames from {}", files.len(), dir.display());
        Ok(Self {
            frames: files.into_iter().map(Pending::File).collect(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Option<RgbImage> {
        match self.frames.pop_front()? {
            Pending::Decoded(frame) => Some(frame),
            Pending::File(path) => match image::open(&path) {
                Ok(img) => Some(img.to_rgb8()),
                Err(e) => {
                    error!("Failed to read frame {}: {}", path.display(), e);
                    None
                }
            },
        }
    }
}

#[cfg(feature = "opencv")]
pub use capture::{mat_to_rgb, rgb_to_mat, CameraManager};

#[cfg(feature = "opencv")]
mod capture {
    use super::FrameSource;
    use crate::config::ScanConfig;
    use crate::error::VisionError;
    use image::RgbImage;
    use opencv::{
        core::Mat,
        imgproc,
        prelude::*,
        videoio::{VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
    };
    use tracing::{info, warn};

    /// Convert an RGB image into a BGR `Mat`
    pub fn rgb_to_mat(image: &RgbImage) -> Result<Mat, VisionError> {
        let flat = Mat::from_slice(image.as_raw())?;
        let rgb = flat.reshape(3, image.height() as i32)?;
        let mut bgr = Mat::default();
        imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
        Ok(bgr)
    }

    /// Convert a BGR `Mat` into an RGB image
    pub fn mat_to_rgb(frame: &Mat) -> Result<RgbImage, VisionError> {
        let mut rgb = Mat::default();
        imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let bytes = rgb.data_bytes()?.to_vec();
        RgbImage::from_raw(width, height, bytes)
            .ok_or_else(|| VisionError::Camera("Frame buffer size mismatch".to_string()))
    }

    /// Camera manager for USB webcam capture
    pub struct CameraManager {
        camera_id: u32,
        resolution: (u32, u32),
        frame_rate: u32,
        capture: Option<VideoCapture>,
    }

    impl CameraManager {
        pub fn new(config: &ScanConfig) -> Self {
            Self {
                camera_id: config.camera_id,
                resolution: config.resolution,
                frame_rate: config.frame_rate,
                capture: None,
            }
        }

        /// Open the device and apply resolution and frame rate
        pub fn initialize(&mut self) -> Result<(), VisionError> {
            if self.capture.is_some() {
                return Ok(());
            }

            let mut capture = VideoCapture::new(self.camera_id as i32, CAP_ANY)
                .map_err(|e| VisionError::Camera(format!("Failed to open camera {}: {}", self.camera_id, e)))?;

            if !capture
                .is_opened()
                .map_err(|e| VisionError::Camera(format!("Camera {} not opened: {}", self.camera_id, e)))?
            {
                return Err(VisionError::Camera(format!("Camera {} failed to open", self.camera_id)));
            }

            capture
                .set(CAP_PROP_FRAME_WIDTH, self.resolution.0 as f64)
                .map_err(|e| VisionError::Camera(format!("Failed to set width: {}", e)))?;
            capture
                .set(CAP_PROP_FRAME_HEIGHT, self.resolution.1 as f64)
                .map_err(|e| VisionError::Camera(format!("Failed to set height: {}", e)))?;
            capture
                .set(CAP_PROP_FPS, self.frame_rate as f64)
                .map_err(|e| VisionError::Camera(format!("Failed to set FPS: {}", e)))?;

            self.capture = Some(capture);
            info!(
                "Camera {} initialized at {}x{} @ {}fps",
                self.camera_id, self.resolution.0, self.resolution.1, self.frame_rate
            );
            Ok(())
        }

        /// Capture a single frame
        pub fn capture_frame(&mut self) -> Result<RgbImage, VisionError> {
            let capture = self
                .capture
                .as_mut()
                .ok_or_else(|| VisionError::Camera("Camera not initialized".to_string()))?;

            let mut frame = Mat::default();
            let grabbed = capture
                .read(&mut frame)
                .map_err(|e| VisionError::Camera(format!("Failed to read frame: {}", e)))?;
            if !grabbed || frame.empty() {
                return Err(VisionError::Camera("Empty frame".to_string()));
            }
            mat_to_rgb(&frame)
        }

        pub fn stop(&mut self) {
            if self.capture.take().is_some() {
                info!("Camera {} stopped", self.camera_id);
            }
        }

        pub fn is_running(&self) -> bool {
            self.capture.is_some()
        }
    }

    impl FrameSource for CameraManager {
        fn next_frame(&mut self) -> Option<RgbImage> {
            match self.capture_frame() {
                Ok(frame) => Some(frame),
                Err(e) => {
                    warn!("Camera read failed: {}", e);
                    None
                }
            }
        }
    }

    impl Drop for CameraManager {
        fn drop(&mut self) {
            self.stop();
        }
    }
}
