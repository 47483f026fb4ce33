//! Messages sent from workers to the coordinator.

use crate::crypto::Keypair;

/// A worker's match.
#[derive(Debug, Clone)]
pub struct FoundEvent {
    /// The ID of the worker that found this match
    pub worker_id: usize,
    /// The matching keypair
    pub keypair: Keypair,
    /// The address (checksummed with 0x prefix)
    pub address: String,
    /// Attempts since the worker's last progress report, including the match
    pub attempts: u64,
}

/// One-way notification from a worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// A batch finished without a match.
    Progress { worker_id: usize, attempts: u64 },
    /// The worker found a match and stopped.
    Found(FoundEvent),
    /// The worker's thread panicked.
    Fault { worker_id: usize, message: String },
}
