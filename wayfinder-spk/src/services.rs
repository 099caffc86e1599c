//! Voice service lifecycle
//!
//! One `VoiceServices` is built at startup and handed to whoever needs to
//! speak or listen. `shutdown` drains pending speech; it runs on drop too.

use crate::config::{RecognizerInput, SpeechConfig};
use crate::engines::LogTtsEngine;
use crate::error::SpeechError;
use crate::recognizer::GrammarRecognizer;
use crate::synthesizer::SpeechSynthesizer;
use crossbeam::channel::Receiver;
use std::sync::Arc;
use tracing::{info, warn};
use wayfinder_core::{SpeechRecognizer, SpeechSink};

pub struct VoiceServices {
    synthesizer: Arc<SpeechSynthesizer>,
    recognizer: Arc<dyn SpeechRecognizer>,
}

impl VoiceServices {
    /// Start the synthesizer and the recognizer. `grammar` is the list of
    /// phrases the recognizer accepts, normally the destination names, and
    /// `lines` carries the typed utterances when text input is enabled.
    ///
    /// A missing native synthesizer is not fatal: speech falls back to the log.
    pub fn initialize(
        config: &SpeechConfig,
        grammar: Vec<String>,
        lines: Receiver<String>,
    ) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;
        let recognizer = match config.recognizer {
            RecognizerInput::Stdin => GrammarRecognizer::from_receiver(grammar, lines),
            RecognizerInput::Disabled => GrammarRecognizer::disabled(grammar),
        };
        Self::with_recognizer(config, recognizer)
    }

    /// Like [`initialize`](Self::initialize) with a recognizer the caller built
    pub fn with_recognizer(config: &SpeechConfig, recognizer: GrammarRecognizer) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        let synthesizer = match SpeechSynthesizer::new(config) {
            Ok(synth) => synth,
            Err(SpeechError::Engine(e)) => {
                warn!("{}; speech will only be logged", e);
                SpeechSynthesizer::with_engine(Box::new(LogTtsEngine::new()), config.queue_size)?
            }
            Err(e) => return Err(e),
        };

        Ok(Self::from_parts(Arc::new(synthesizer), Arc::new(recognizer)))
    }

    pub fn from_parts(synthesizer: Arc<SpeechSynthesizer>, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        info!("Voice services initialized ({} engine)", synthesizer.engine_name());
        Self {
            synthesizer,
            recognizer,
        }
    }

    pub fn speaker(&self) -> Arc<dyn SpeechSink> {
        self.synthesizer.clone()
    }

    pub fn recognizer(&self) -> &dyn SpeechRecognizer {
        self.recognizer.as_ref()
    }

    pub fn synthesizer(&self) -> &SpeechSynthesizer {
        &self.synthesizer
    }

    /// Stop accepting speech and wait for queued utterances to play
    pub fn shutdown(&self) {
        self.synthesizer.shutdown();
        info!("Voice services shut down");
    }
}

impl Drop for VoiceServices {
    fn drop(&mut self) {
        if self.synthesizer.is_running() {
            self.shutdown();
        }
    }
}
