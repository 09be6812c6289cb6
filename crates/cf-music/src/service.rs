//! Service thread — drives `MusicSequencer::service` on a fixed interval
//! for hosts without a periodic tick of their own.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;

use cf_core::CfResult;

use crate::sequencer::MusicSequencer;

/// Background timer calling `service()` until stopped or dropped
pub struct ServiceThread {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ServiceThread {
    pub fn spawn(sequencer: Arc<Mutex<MusicSequencer>>, interval: Duration) -> CfResult<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = std::thread::Builder::new()
            .name("clawforge-music".into())
            .spawn(move || {
                log::debug!("Music service thread started ({:?} interval)", interval);
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            sequencer.lock().service();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("Music service thread stopped");
            })?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Music service thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for ServiceThread {
    fn drop(&mut self) {
        self.stop();
    }
}
