//! Native platform TTS engine
//!
//! Drives the platform synthesizer through its command-line front end:
//! `espeak-ng` on Linux, `say` on macOS.

use crate::config::SpeechConfig;
use crate::engines::{sanitize_text, TtsEngine};
use crate::error::SpeechError;
use std::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Espeak,
    Say,
}

impl Backend {
    fn program(self) -> &'static str {
        match self {
            Backend::Espeak => "espeak-ng",
            Backend::Say => "say",
        }
    }

    fn for_platform() -> Option<Self> {
        if cfg!(target_os = "linux") {
            Some(Backend::Espeak)
        } else if cfg!(target_os = "macos") {
            Some(Backend::Say)
        } else {
            None
        }
    }

    fn probe(self) -> bool {
        let mut cmd = Command::new(self.program());
        match self {
            Backend::Espeak => cmd.arg("--version"),
            Backend::Say => cmd.arg("-v").arg("?"),
        };
        cmd.output().map(|o| o.status.success()).unwrap_or(false)
    }
}

/// Native TTS engine (platform-specific)
pub struct NativeTtsEngine {
    backend: Option<Backend>,
    voice: Option<String>,
    rate: u32,
    volume: f32,
    pitch: f32,
}

impl NativeTtsEngine {
    pub fn new() -> Self {
        Self::from_config(&SpeechConfig::default())
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        let backend = Backend::for_platform().filter(|b| b.probe());
        match backend {
            Some(b) => info!("Native TTS engine initialized ({})", b.program()),
            None => warn!("No native TTS program found"),
        }
        Self {
            backend,
            voice: config.voice.name.clone(),
            rate: config.rate,
            volume: config.volume,
            pitch: config.pitch,
        }
    }

    fn command(&self, backend: Backend, text: &str) -> Command {
        let mut cmd = Command::new(backend.program());
        match backend {
            Backend::Espeak => {
                cmd.arg("-s").arg(self.rate.to_string());
                // espeak-ng amplitude is 0-200 with 100 as normal
                let amplitude = (self.volume * 200.0).round().clamp(0.0, 200.0) as u32;
                cmd.arg("-a").arg(amplitude.to_string());
                // pitch 0-99, 50 is normal
                let pitch = (50.0 + self.pitch * 49.0).round().clamp(0.0, 99.0) as u32;
                cmd.arg("-p").arg(pitch.to_string());
                if let Some(voice) = &self.voice {
                    cmd.arg("-v").arg(voice);
                }
            }
            Backend::Say => {
                cmd.arg("-r").arg(self.rate.to_string());
                if let Some(voice) = &self.voice {
                    cmd.arg("-v").arg(voice);
                }
            }
        }
        cmd.arg("--").arg(text);
        cmd
    }
}

impl Default for NativeTtsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsEngine for NativeTtsEngine {
    fn say(&self, text: &str) -> Result<(), SpeechError> {
        let backend = self
            .backend
            .ok_or_else(|| SpeechError::Engine("Native TTS engine not available".to_string()))?;

        let sanitized = sanitize_text(text);
        if sanitized.is_empty() {
            return Err(SpeechError::Engine("Text is empty after sanitization".to_string()));
        }

        debug!("{} speaking {} chars", backend.program(), sanitized.len());
        let output = self
            .command(backend, &sanitized)
            .output()
            .map_err(|e| SpeechError::Engine(format!("Failed to run {}: {}", backend.program(), e)))?;

        if !output.status.success() {
            return Err(SpeechError::Engine(format!(
                "{} failed: {}",
                backend.program(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    fn name(&self) -> &str {
        "native"
    }
}
