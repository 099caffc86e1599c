//! TTS engine implementations

pub mod log;
pub mod native;

use crate::config::{EngineKind, SpeechConfig};
use crate::error::SpeechError;

pub use self::log::LogTtsEngine;
pub use self::native::NativeTtsEngine;

/// Longest utterance handed to an engine
pub const MAX_UTTERANCE_CHARS: usize = 10_000;

/// A blocking text-to-speech backend. Called from the synthesizer's worker thread only.
pub trait TtsEngine: Send {
    /// Speak `text`, returning once playback is done
    fn say(&self, text: &str) -> Result<(), SpeechError>;

    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

/// Strip control characters and shell metacharacters before text reaches a
/// command line.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() && !matches!(c, ';' | '|' | '&' | '$' | '`' | '(' | ')' | '<' | '>'))
        .take(MAX_UTTERANCE_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Build the engine `config` asks for. A disabled config always gets the log engine.
pub fn create_engine(config: &SpeechConfig) -> Result<Box<dyn TtsEngine>, SpeechError> {
    if !config.enabled {
        return Ok(Box::new(LogTtsEngine::new()));
    }
    match config.engine {
        EngineKind::Native => {
            let engine = NativeTtsEngine::from_config(config);
            if !engine.is_available() {
                return Err(SpeechError::Engine("Native TTS engine not available".to_string()));
            }
            Ok(Box::new(engine))
        }
        EngineKind::Log => Ok(Box::new(LogTtsEngine::new())),
    }
}
