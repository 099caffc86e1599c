//! Error types for wayfinder-spk

use thiserror::Error;
use wayfinder_core::Error as CoreError;

/// Speech synthesis and recognition errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<SpeechError> for CoreError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Core(inner) => inner,
            other => CoreError::Configuration(format!("Speech error: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_core_error() {
        let err: CoreError = SpeechError::Engine("espeak-ng missing".to_string()).into();
        assert!(matches!(err, CoreError::Configuration(msg) if msg.contains("espeak-ng missing")));
    }

    #[test]
    fn test_core_error_passes_through() {
        let err: CoreError = SpeechError::Core(CoreError::NodeNotFound("N001".to_string())).into();
        assert!(matches!(err, CoreError::NodeNotFound(_)));
    }
}
