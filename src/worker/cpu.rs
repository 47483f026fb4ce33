//! CPU-based worker for vanity address generation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::crypto::CandidateGenerator;
use crate::matcher::Pattern;

use super::event::{FoundEvent, WorkerEvent};

/// Why a worker's loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// A match was found and reported
    Found,
    /// The stop flag was raised
    Stopped,
    /// The coordinator stopped listening
    Disconnected,
}

/// A worker that generates and tests keypairs on its own thread.
pub struct SearchWorker<G> {
    /// Worker ID
    id: usize,
    /// The pattern to match against
    pattern: Pattern,
    /// Source of candidate keypairs
    generator: G,
    /// Attempts between progress reports
    batch_size: u64,
    /// Channel to the coordinator
    event_tx: Sender<WorkerEvent>,
    /// Raised by the coordinator; only read here
    stop_flag: Arc<AtomicBool>,
}

impl<G: CandidateGenerator> SearchWorker<G> {
    /// Creates a new search worker.
    pub fn new(
        id: usize,
        pattern: Pattern,
        generator: G,
        batch_size: u64,
        event_tx: Sender<WorkerEvent>,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            pattern,
            generator,
            batch_size,
            event_tx,
            stop_flag,
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates keypairs and tests them against the pattern in batches,
    /// reporting each full batch as progress, until:
    /// - A match is found (reported with the attempts of the current batch)
    /// - Stop flag is set
    /// - Channel is closed
    pub fn run(&mut self) -> WorkerExit {
        loop {
            let mut attempts = 0u64;

            while attempts < self.batch_size {
                if self.stop_flag.load(Ordering::Relaxed) {
                    return WorkerExit::Stopped;
                }

                let candidate = self.generator.generate();
                attempts += 1;

                let lowercase = candidate.address.to_hex();
                if self
                    .pattern
                    .matches(&lowercase, candidate.checksum.as_deref())
                    .is_match()
                {
                    let address = match candidate.checksum {
                        Some(checksum) => format!("0x{}", checksum),
                        None => candidate.address.to_checksum(),
                    };

                    let event = WorkerEvent::Found(FoundEvent {
                        worker_id: self.id,
                        keypair: candidate.keypair,
                        address,
                        attempts,
                    });

                    // Nothing left to do if the coordinator is gone
                    let _ = self.event_tx.send(event);
                    return WorkerExit::Found;
                }
            }

            let progress = WorkerEvent::Progress {
                worker_id: self.id,
                attempts,
            };
            if self.event_tx.send(progress).is_err() {
                return WorkerExit::Disconnected;
            }
        }
    }
}
