//! wayfinder-spk: Voice output and spoken destination input
//!
//! Provides the concrete voice services behind the core's `SpeechSink` and
//! `SpeechRecognizer` interfaces:
//! - a queued, non-blocking synthesizer over native or log-only engines
//! - a grammar-restricted recognizer with a bounded wait
//! - the `VoiceServices` object owning both for the life of the process

pub mod config;
pub mod engines;
pub mod error;
pub mod recognizer;
pub mod services;
pub mod synthesizer;

pub use config::{EngineKind, RecognizerInput, SpeechConfig, VoiceConfig};
pub use engines::TtsEngine;
pub use error::SpeechError;
pub use recognizer::GrammarRecognizer;
pub use services::VoiceServices;
pub use synthesizer::SpeechSynthesizer;
