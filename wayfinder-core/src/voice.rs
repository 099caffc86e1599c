//! Voice service interfaces
//!
//! Engines live in `wayfinder-spk`; the guidance loop and the navigator only
//! see these traits and receive their implementations explicitly.

use std::time::Duration;

/// Fire-and-forget speech output. `speak` must not wait for playback.
pub trait SpeechSink: Send + Sync {
    fn speak(&self, text: &str);
}

/// Single-shot recognizer over a fixed grammar supplied at construction.
pub trait SpeechRecognizer: Send + Sync {
    /// Block up to `timeout` for one utterance. `None` means nothing in the
    /// grammar was understood before the deadline.
    fn recognize(&self, timeout: Duration) -> Option<String>;
}

impl<T: SpeechSink + ?Sized> SpeechSink for &T {
    fn speak(&self, text: &str) {
        (**self).speak(text)
    }
}

impl<T: SpeechSink + ?Sized> SpeechSink for std::sync::Arc<T> {
    fn speak(&self, text: &str) {
        (**self).speak(text)
    }
}
