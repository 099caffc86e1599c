//! Engine that only logs what would have been said

use crate::engines::TtsEngine;
use crate::error::SpeechError;
use tracing::info;

#[derive(Debug, Default)]
pub struct LogTtsEngine;

impl LogTtsEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TtsEngine for LogTtsEngine {
    fn say(&self, text: &str) -> Result<(), SpeechError> {
        info!(target: "wayfinder::speech", "{}", text);
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "log"
    }
}
