//! Fire-and-forget settings writer running on its own thread

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use super::{Persist, PersistentStore};
use crate::config::Configuration;
use crate::constants::writer::THREAD_NAME;

/// Hands snapshots to a background thread so `update` never waits on I/O.
/// Bursts of changes are coalesced: only the newest queued snapshot is written.
pub struct BackgroundWriter {
    sender: Option<Sender<Configuration>>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundWriter {
    pub fn spawn(store: PersistentStore) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(store, receiver))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Flush queued snapshots and stop the writer thread
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        // Dropping the sender ends the receive loop once the queue is drained
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Settings writer thread panicked");
            }
        }
    }
}

impl Persist for BackgroundWriter {
    fn persist(&self, config: &Configuration) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(config.clone()).is_err() {
            warn!(version = config.version, "Settings writer is gone; change not persisted");
        }
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn run(store: PersistentStore, receiver: Receiver<Configuration>) {
    info!(key = %store.key(), "Settings writer started");
    while let Ok(mut latest) = receiver.recv() {
        for newer in receiver.try_iter() {
            latest = newer;
        }
        store.save(&latest);
    }
    debug!("Settings writer stopped");
}
