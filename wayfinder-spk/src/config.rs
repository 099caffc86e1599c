//! Configuration for speech synthesis and recognition

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Speech configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speak at all. When off every message is only logged.
    pub enabled: bool,

    /// Preferred TTS engine
    pub engine: EngineKind,

    /// Voice settings
    pub voice: VoiceConfig,

    /// Speech rate (words per minute, 50-500, default 150)
    pub rate: u32,

    /// Volume (0.0-1.0, default 0.8)
    pub volume: f32,

    /// Pitch adjustment (-1.0 to 1.0, default 0.0)
    pub pitch: f32,

    /// Pending utterances kept before new ones are dropped
    pub queue_size: usize,

    /// Where spoken destinations are read from
    pub recognizer: RecognizerInput,
}

/// TTS engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineKind {
    /// Platform synthesizer (espeak-ng on Linux, `say` on macOS)
    Native,
    /// Write utterances to the log only
    Log,
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(EngineKind::Native),
            "log" => Ok(EngineKind::Log),
            other => Err(format!("Unknown speech engine '{}'", other)),
        }
    }
}

/// Recognizer input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognizerInput {
    /// One utterance per typed line, read by the caller and passed in as a channel
    Stdin,
    /// No recognizer; every listen times out
    Disabled,
}

/// Voice configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Voice name/identifier passed to the engine
    pub name: Option<String>,

    /// Language code (e.g., "en-US")
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: EngineKind::Native,
            voice: VoiceConfig::default(),
            rate: 150,
            volume: 0.8,
            pitch: 0.0,
            queue_size: 16,
            recognizer: RecognizerInput::Stdin,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            name: None,
            language: "en-US".to_string(),
        }
    }
}

impl SpeechConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.rate < 50 || self.rate > 500 {
            return Err("Speech rate must be between 50 and 500 words per minute".to_string());
        }

        if !(0.0..=1.0).contains(&self.volume) {
            return Err("Volume must be between 0.0 and 1.0".to_string());
        }

        if !(-1.0..=1.0).contains(&self.pitch) {
            return Err("Pitch must be between -1.0 and 1.0".to_string());
        }

        if self.queue_size == 0 || self.queue_size > 1024 {
            return Err("Queue size must be between 1 and 1024".to_string());
        }

        self.voice.validate()
    }
}

impl VoiceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.language.is_empty() {
            return Err("Language code cannot be empty".to_string());
        }

        if !self.language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("Language code contains invalid characters (only alphanumeric and '-' allowed)".to_string());
        }

        if let Some(ref name) = self.name {
            if name.is_empty() || name.len() > 256 {
                return Err("Voice name must be 1 to 256 characters".to_string());
            }
            if name.chars().any(|c| c.is_control()) {
                return Err("Voice name contains invalid characters".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpeechConfig::default();
        assert!(config.enabled);
        assert_eq!(config.engine, EngineKind::Native);
        assert_eq!(config.rate, 150);
        assert_eq!(config.voice.language, "en-US");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_ranges() {
        let mut config = SpeechConfig::default();
        config.rate = 10;
        assert!(config.validate().is_err());

        let mut config = SpeechConfig::default();
        config.volume = 1.5;
        assert!(config.validate().is_err());

        let mut config = SpeechConfig::default();
        config.pitch = -2.0;
        assert!(config.validate().is_err());

        let mut config = SpeechConfig::default();
        config.queue_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_voice_validation() {
        let mut voice = VoiceConfig::default();
        voice.language = "en_US;".to_string();
        assert!(voice.validate().is_err());

        let mut voice = VoiceConfig::default();
        voice.name = Some(String::new());
        assert!(voice.validate().is_err());

        let mut voice = VoiceConfig::default();
        voice.name = Some("mb-en1".to_string());
        assert!(voice.validate().is_ok());
    }

    #[test]
    fn test_engine_from_str() {
        assert_eq!("Native".parse::<EngineKind>(), Ok(EngineKind::Native));
        assert_eq!(" log ".parse::<EngineKind>(), Ok(EngineKind::Log));
        assert!("polly".parse::<EngineKind>().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: SpeechConfig = serde_json::from_str(r#"{"engine": "Log", "rate": 180}"#).unwrap();
        assert_eq!(config.engine, EngineKind::Log);
        assert_eq!(config.rate, 180);
        assert_eq!(config.recognizer, RecognizerInput::Stdin);
    }
}
