//! Speech synthesizer with a bounded playback queue
//!
//! `speak` never blocks: utterances are queued for a worker thread that owns
//! the engine and plays them one at a time. When the queue is full the new
//! utterance is dropped.

use crate::config::SpeechConfig;
use crate::engines::{create_engine, TtsEngine};
use crate::error::SpeechError;
use crossbeam::channel::{bounded, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};
use wayfinder_core::SpeechSink;

pub struct SpeechSynthesizer {
    engine_name: String,
    sender: Mutex<Option<Sender<String>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    dropped: Arc<AtomicUsize>,
}

impl SpeechSynthesizer {
    /// Create a synthesizer with the engine selected by `config`
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;
        let engine = create_engine(config)?;
        Self::with_engine(engine, config.queue_size)
    }

    pub fn with_engine(engine: Box<dyn TtsEngine>, queue_size: usize) -> Result<Self, SpeechError> {
        if queue_size == 0 {
            return Err(SpeechError::Config("Queue size must be at least 1".to_string()));
        }
        let engine_name = engine.name().to_string();
        let (sender, receiver) = bounded::<String>(queue_size);

        let worker = std::thread::Builder::new()
            .name("wayfinder-speech".to_string())
            .spawn(move || {
                for text in receiver.iter() {
                    if let Err(e) = engine.say(&text) {
                        warn!("Speech engine failed: {}", e);
                    }
                }
                debug!("speech worker exiting");
            })?;

        info!("Speech synthesizer started with {} engine", engine_name);
        Ok(Self {
            engine_name,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            dropped: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    /// Utterances discarded because the queue was full or closed
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Close the queue, let the worker finish what is pending and join it.
    pub fn shutdown(&self) {
        // Dropping the sender ends the worker's receive loop
        if self.sender.lock().take().is_none() {
            return;
        }
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                error!("Speech worker panicked");
            }
        }
        info!("Speech synthesizer stopped");
    }
}

impl SpeechSink for SpeechSynthesizer {
    fn speak(&self, text: &str) {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("Speech synthesizer is shut down, dropping: {}", text);
            return;
        };
        match sender.try_send(text.to_string()) {
            Ok(()) => debug!("queued utterance ({} chars)", text.len()),
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Speech queue full, dropping: {}", text);
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                error!("Speech worker is gone, dropping: {}", text);
            }
        }
    }
}

impl Drop for SpeechSynthesizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
