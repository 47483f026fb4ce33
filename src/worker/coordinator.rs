//! Search coordination: spawning workers, tallying their progress and
//! settling on the first match.

use std::io;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{ConfigError, SearchConfig};
use crate::crypto::{CandidateGenerator, KeyGenerator};
use crate::matcher::Pattern;

use super::event::{FoundEvent, WorkerEvent};
use super::pool::WorkerPool;

/// Result of a successful vanity search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The Ethereum address (checksummed with 0x prefix)
    pub address: String,
    /// The private key (hex encoded, no 0x prefix)
    #[serde(rename = "privKey")]
    pub private_key: String,
    /// The uncompressed public key without format byte (hex, no 0x prefix)
    #[serde(rename = "pubKey")]
    pub public_key: String,
    /// Keypairs tested across all workers
    #[serde(rename = "attempts")]
    pub total_attempts: u64,
    /// Wall-clock time of the search
    pub elapsed_seconds: f64,
    /// Number of workers that took part
    pub worker_count: usize,
}

impl SearchResult {
    fn from_found(found: FoundEvent, total_attempts: u64, elapsed: Duration, worker_count: usize) -> Self {
        Self {
            address: found.address,
            private_key: found.keypair.private_key_hex(),
            public_key: found.keypair.public_key_hex(),
            total_attempts,
            elapsed_seconds: elapsed.as_secs_f64(),
            worker_count,
        }
    }

    /// Returns the average generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        if self.elapsed_seconds > 0.0 {
            self.total_attempts as f64 / self.elapsed_seconds
        } else {
            0.0
        }
    }
}

/// How a search ended, when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(SearchResult),
    Cancelled,
}

/// A snapshot of search progress for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub total_attempts: u64,
    pub elapsed: Duration,
    pub worker_count: usize,
}

impl Progress {
    /// Returns the current generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.total_attempts as f64 / elapsed
        } else {
            0.0
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("Worker {worker_id} failed: {message}")]
    WorkerFault { worker_id: usize, message: String },

    #[error("All workers exited without finding a match")]
    WorkersExited,
}

/// Requests cancellation of a running search from any thread.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Sender<()>,
}

impl CancelHandle {
    /// Cancels the search. Repeated calls have no further effect.
    pub fn cancel(&self) {
        let _ = self.tx.try_send(());
    }
}

/// What the coordinator does after folding in one event.
#[derive(Debug)]
pub(crate) enum Step {
    Continue,
    Ignored,
    Found { event: FoundEvent, total_attempts: u64 },
    Fault { worker_id: usize, message: String },
}

/// Attempt total and resolution latch, touched only by the coordinator's
/// event loop.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    total_attempts: u64,
    resolved: bool,
}

impl Tally {
    pub(crate) fn record(&mut self, event: WorkerEvent) -> Step {
        if self.resolved {
            return Step::Ignored;
        }

        match event {
            WorkerEvent::Progress { attempts, .. } => {
                self.total_attempts += attempts;
                Step::Continue
            }
            WorkerEvent::Found(event) => {
                self.resolved = true;
                self.total_attempts += event.attempts;
                Step::Found {
                    event,
                    total_attempts: self.total_attempts,
                }
            }
            WorkerEvent::Fault { worker_id, message } => {
                self.resolved = true;
                Step::Fault { worker_id, message }
            }
        }
    }

    pub(crate) fn total_attempts(&self) -> u64 {
        self.total_attempts
    }
}

/// Runs one vanity search across a pool of workers.
pub struct SearchCoordinator {
    config: SearchConfig,
    pattern: Pattern,
    worker_count: usize,
    cancel_tx: Sender<()>,
    cancel_rx: Receiver<()>,
}

impl SearchCoordinator {
    /// Validates the configuration and clamps its worker count.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;

        let pattern = config.compiled_pattern();
        let worker_count = config.effective_workers();
        if worker_count != config.worker_count {
            warn!(
                requested = config.worker_count,
                using = worker_count,
                "worker count clamped"
            );
        }

        let (cancel_tx, cancel_rx) = bounded(1);

        Ok(Self {
            config,
            pattern,
            worker_count,
            cancel_tx,
            cancel_rx,
        })
    }

    /// Returns a handle that cancels this search.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    /// Returns the normalized pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the number of workers the search will spawn.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Runs the search with keypairs drawn from operating system entropy.
    ///
    /// `on_progress` is called from the calling thread every report interval
    /// until the search ends.
    pub fn run<P>(self, on_progress: P) -> Result<SearchOutcome, SearchError>
    where
        P: FnMut(&Progress),
    {
        let with_checksum = self.config.case_sensitive;
        self.run_with(move |_| KeyGenerator::new(with_checksum), on_progress)
    }

    /// Runs the search with generators built by `make_generator`, which is
    /// called once per worker with the worker's ID.
    pub fn run_with<G, F, P>(
        self,
        mut make_generator: F,
        mut on_progress: P,
    ) -> Result<SearchOutcome, SearchError>
    where
        G: CandidateGenerator + 'static,
        F: FnMut(usize) -> G,
        P: FnMut(&Progress),
    {
        let started = Instant::now();

        if self.pattern.is_empty() {
            if self.cancel_rx.try_recv().is_ok() {
                return Ok(SearchOutcome::Cancelled);
            }

            // Any keypair matches; generate one on this thread.
            let candidate = make_generator(0).generate();
            let found = FoundEvent {
                worker_id: 0,
                address: candidate.address.to_checksum(),
                keypair: candidate.keypair,
                attempts: 1,
            };
            return Ok(SearchOutcome::Found(SearchResult::from_found(
                found,
                1,
                started.elapsed(),
                1,
            )));
        }

        let (event_tx, event_rx) = unbounded();
        let pool = WorkerPool::spawn(
            self.worker_count,
            &self.pattern,
            self.config.batch_size,
            make_generator,
            event_tx,
        )
        .map_err(SearchError::Spawn)?;

        info!(
            pattern = self.pattern.pattern(),
            position = %self.pattern.position(),
            case_sensitive = self.pattern.is_case_sensitive(),
            workers = self.worker_count,
            "search started"
        );

        let ticker = tick(self.config.report_interval);
        let mut tally = Tally::default();

        let outcome = loop {
            select! {
                recv(event_rx) -> event => match event {
                    Ok(event) => match tally.record(event) {
                        Step::Continue | Step::Ignored => {}
                        Step::Found { event, total_attempts } => {
                            info!(worker = event.worker_id, total_attempts, "match found");
                            break Ok(SearchOutcome::Found(SearchResult::from_found(
                                event,
                                total_attempts,
                                started.elapsed(),
                                self.worker_count,
                            )));
                        }
                        Step::Fault { worker_id, message } => {
                            error!(worker = worker_id, %message, "worker failed");
                            break Err(SearchError::WorkerFault { worker_id, message });
                        }
                    },
                    Err(_) => {
                        error!("all workers exited without a result");
                        break Err(SearchError::WorkersExited);
                    }
                },
                recv(self.cancel_rx) -> _ => {
                    info!(total_attempts = tally.total_attempts(), "search cancelled");
                    break Ok(SearchOutcome::Cancelled);
                },
                recv(ticker) -> _ => {
                    on_progress(&Progress {
                        total_attempts: tally.total_attempts(),
                        elapsed: started.elapsed(),
                        worker_count: self.worker_count,
                    });
                },
            }
        };

        pool.join();
        outcome
    }
}

/// Runs a search to completion without progress reporting.
pub fn search(config: SearchConfig) -> Result<SearchOutcome, SearchError> {
    SearchCoordinator::new(config)?.run(|_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn progress(worker_id: usize, attempts: u64) -> WorkerEvent {
        WorkerEvent::Progress {
            worker_id,
            attempts,
        }
    }

    fn found(worker_id: usize, attempts: u64, address: &str) -> WorkerEvent {
        WorkerEvent::Found(FoundEvent {
            worker_id,
            keypair: Keypair::from_parts([worker_id as u8; 32], [0u8; 64]),
            address: address.into(),
            attempts,
        })
    }

    #[test]
    fn test_first_found_wins() {
        // Worker B (1) matches on its 2nd attempt, worker A (0) on its 3rd,
        // and B's event arrives first.
        let mut tally = Tally::default();
        let accepted = tally.record(found(1, 2, "0xbbbb"));
        let late = tally.record(found(0, 3, "0xaaaa"));

        match accepted {
            Step::Found {
                event,
                total_attempts,
            } => {
                assert_eq!(event.worker_id, 1);
                assert_eq!(event.address, "0xbbbb");
                assert_eq!(total_attempts, 2);
            }
            other => panic!("expected found, got {:?}", other),
        }
        assert!(matches!(late, Step::Ignored));
        assert_eq!(tally.total_attempts(), 2);
    }

    #[test]
    fn test_attempts_are_not_double_counted() {
        let mut tally = Tally::default();
        let events = vec![
            progress(0, 100),
            progress(1, 100),
            progress(0, 100),
            progress(2, 100),
            found(1, 37, "0x1"),
            progress(0, 100),
            progress(2, 100),
        ];

        let mut accepted_total = None;
        for event in events {
            if let Step::Found { total_attempts, .. } = tally.record(event) {
                accepted_total = Some(total_attempts);
            }
        }

        // 4 batches of 100 plus the 37 of worker 1's partial batch
        assert_eq!(accepted_total, Some(437));
        assert_eq!(tally.total_attempts(), 437);
    }

    #[test]
    fn test_fault_resolves_search() {
        let mut tally = Tally::default();
        tally.record(progress(0, 10));
        let step = tally.record(WorkerEvent::Fault {
            worker_id: 2,
            message: "boom".into(),
        });
        assert!(matches!(step, Step::Fault { worker_id: 2, .. }));
        assert!(matches!(tally.record(found(0, 1, "0x1")), Step::Ignored));
    }

    #[test]
    fn test_found_after_fault_is_ignored() {
        let mut tally = Tally::default();
        tally.record(found(0, 1, "0x1"));
        assert!(matches!(
            tally.record(WorkerEvent::Fault {
                worker_id: 1,
                message: "late".into(),
            }),
            Step::Ignored
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_spawn() {
        let config = SearchConfig::new("nothex", crate::Position::Prefix, false);
        assert!(matches!(
            SearchCoordinator::new(config),
            Err(SearchError::InvalidConfig(ConfigError::InvalidPattern(_)))
        ));
    }

    #[test]
    fn test_progress_rate() {
        let progress = Progress {
            total_attempts: 500,
            elapsed: Duration::from_secs(2),
            worker_count: 4,
        };
        assert_eq!(progress.keys_per_second(), 250.0);
    }
}
