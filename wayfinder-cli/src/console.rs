//! Line input from the terminal
//!
//! A single thread owns stdin. Its lines feed both the scan cancel watcher
//! and the destination recognizer, one consumer at a time.

use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use crossbeam::select;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

pub struct ConsoleInput {
    lines: Receiver<String>,
}

impl ConsoleInput {
    pub fn spawn() -> Self {
        let (tx, rx) = unbounded();
        let spawned = std::thread::Builder::new()
            .name("wayfinder-console".to_string())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("stdin read failed: {}", e);
                            break;
                        }
                    }
                }
                debug!("console input closed");
            });
        if let Err(e) = spawned {
            warn!("Console input unavailable: {}", e);
        }
        Self { lines: rx }
    }

    pub fn lines(&self) -> Receiver<String> {
        self.lines.clone()
    }

    /// Set `flag` when the next line (Enter) arrives. Watching stops when the
    /// returned guard is dropped, leaving later lines to other readers.
    pub fn watch_for_cancel(&self, flag: Arc<AtomicBool>) -> CancelWatch {
        let lines = self.lines.clone();
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let handle = std::thread::Builder::new()
            .name("wayfinder-cancel".to_string())
            .spawn(move || {
                select! {
                    recv(lines) -> line => {
                        if line.is_ok() {
                            flag.store(true, Ordering::Relaxed);
                        }
                    }
                    recv(stop_rx) -> _ => {}
                }
            });
        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Cancel watcher failed to start: {}", e);
                None
            }
        };
        CancelWatch {
            stop: Some(stop_tx),
            handle,
        }
    }
}

pub struct CancelWatch {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for CancelWatch {
    fn drop(&mut self) {
        // Disconnecting the stop channel wakes the watcher
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
