//! Grammar-restricted recognizer
//!
//! Utterances arrive as text lines on a channel fed by whoever owns the
//! input: typed answers read by the console, or an external speech-to-text
//! process. The recognizer never reads stdin itself. Only phrases in
//! the grammar fixed at construction are accepted, returned in their
//! canonical spelling.

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::{debug, info};
use wayfinder_core::SpeechRecognizer;

pub struct GrammarRecognizer {
    grammar: Vec<String>,
    lines: Option<Receiver<String>>,
}

fn normalize(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

impl GrammarRecognizer {
    /// Recognizer fed by an existing line channel
    pub fn from_receiver(grammar: Vec<String>, lines: Receiver<String>) -> Self {
        info!("Recognizer ready with {} phrases", grammar.len());
        Self {
            grammar,
            lines: Some(lines),
        }
    }

    /// Recognizer plus the sender that feeds it
    pub fn channel(grammar: Vec<String>) -> (Sender<String>, Self) {
        let (tx, rx) = unbounded();
        (tx, Self::from_receiver(grammar, rx))
    }

    /// Never recognizes anything
    pub fn disabled(grammar: Vec<String>) -> Self {
        Self { grammar, lines: None }
    }

    pub fn grammar(&self) -> &[String] {
        &self.grammar
    }

    /// Canonical grammar entry for `utterance`, ignoring case and spacing
    pub fn match_phrase(&self, utterance: &str) -> Option<String> {
        let wanted = normalize(utterance);
        if wanted.is_empty() {
            return None;
        }
        self.grammar.iter().find(|p| normalize(p) == wanted).cloned()
    }
}

impl SpeechRecognizer for GrammarRecognizer {
    fn recognize(&self, timeout: Duration) -> Option<String> {
        let lines = self.lines.as_ref()?;
        match lines.recv_timeout(timeout) {
            Ok(utterance) => {
                let matched = self.match_phrase(&utterance);
                match &matched {
                    Some(phrase) => info!("Recognized: {}", phrase),
                    None => debug!("utterance outside grammar: {:?}", utterance),
                }
                matched
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!("recognizer timed out after {:?}", timeout);
                None
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!("recognizer input closed");
                None
            }
        }
    }
}
