use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error};

use super::Engine;

enum Signal {
    Flush,
    Shutdown,
}

/// Background write-back of dirty state, on a fixed interval and on request.
pub(crate) struct Flusher {
    tx: Sender<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl Flusher {
    pub(crate) fn spawn(engine: Arc<Engine>, interval: Duration) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("chatledger-flush".into())
            .spawn(move || loop {
                match rx.recv_timeout(interval) {
                    Ok(Signal::Flush) | Err(RecvTimeoutError::Timeout) => {
                        if let Err(e) = engine.flush() {
                            error!(error = %e, "background flush failed");
                        }
                    }
                    Ok(Signal::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                        debug!("flusher stopping");
                        if let Err(e) = engine.flush() {
                            error!(error = %e, "final flush failed");
                        }
                        break;
                    }
                }
            })
            .context("Failed to start flush thread")?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Ask for a flush without waiting for the interval.
    pub(crate) fn request(&self) {
        // A closed channel means the thread already ran its final flush.
        let _ = self.tx.send(Signal::Flush);
    }

    /// Stop the thread after one last flush.
    pub(crate) fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let _ = self.tx.send(Signal::Shutdown);
        handle
            .join()
            .map_err(|_| anyhow!("flush thread panicked"))
    }
}

impl Drop for Flusher {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!(error = %e, "flusher did not stop cleanly");
        }
    }
}
