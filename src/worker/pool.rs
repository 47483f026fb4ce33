//! Worker thread management.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::debug;

use crate::crypto::CandidateGenerator;
use crate::matcher::Pattern;

use super::cpu::SearchWorker;
use super::event::WorkerEvent;

/// Owns the threads of one search's workers.
///
/// Dropping the pool raises the stop flag and joins every thread.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Stop flag, written only by the pool's owner
    stop_flag: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Spawns `num_workers` worker threads, each with its own generator
    /// from `make_generator`.
    ///
    /// If a thread cannot be spawned, the workers already running are
    /// stopped and joined before the error is returned.
    pub fn spawn<G, F>(
        num_workers: usize,
        pattern: &Pattern,
        batch_size: u64,
        mut make_generator: F,
        event_tx: Sender<WorkerEvent>,
    ) -> io::Result<Self>
    where
        G: CandidateGenerator + 'static,
        F: FnMut(usize) -> G,
    {
        let mut pool = Self {
            num_workers,
            handles: Some(Vec::with_capacity(num_workers)),
            stop_flag: Arc::new(AtomicBool::new(false)),
        };

        for id in 0..num_workers {
            let generator = make_generator(id);
            let pattern = pattern.clone();
            let event_tx = event_tx.clone();
            let stop_flag = pool.stop_flag.clone();

            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || {
                    let fault_tx = event_tx.clone();
                    let mut worker =
                        SearchWorker::new(id, pattern, generator, batch_size, event_tx, stop_flag);

                    match panic::catch_unwind(AssertUnwindSafe(|| worker.run())) {
                        Ok(exit) => debug!(worker = id, ?exit, "worker finished"),
                        Err(payload) => {
                            let message = panic_message(payload.as_ref());
                            debug!(worker = id, %message, "worker panicked");
                            let _ = fault_tx.send(WorkerEvent::Fault {
                                worker_id: id,
                                message,
                            });
                        }
                    }
                })?;

            if let Some(handles) = pool.handles.as_mut() {
                handles.push(handle);
            }
        }

        Ok(pool)
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops all workers and waits for their threads to exit.
    pub fn join(mut self) {
        self.join_all();
    }

    fn join_all(&mut self) {
        self.stop();
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Address, Candidate, Keypair};
    use crate::matcher::Position;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    struct Zeros;

    impl CandidateGenerator for Zeros {
        fn generate(&mut self) -> Candidate {
            Candidate {
                keypair: Keypair::from_parts([1u8; 32], [0u8; 64]),
                address: Address::from_bytes([0u8; 20]),
                checksum: None,
            }
        }
    }

    struct Exploding;

    impl CandidateGenerator for Exploding {
        fn generate(&mut self) -> Candidate {
            panic!("entropy source failed");
        }
    }

    #[test]
    fn test_join_stops_workers() {
        let (tx, rx) = unbounded();
        let pattern = Pattern::new("ffff", Position::Prefix, false);
        let pool = WorkerPool::spawn(2, &pattern, 10, |_| Zeros, tx).unwrap();
        assert_eq!(pool.num_workers(), 2);

        // Both workers are producing progress
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        pool.join();

        // Once every worker has exited the channel disconnects
        while rx.recv_timeout(Duration::from_secs(5)).is_ok() {}
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_panic_becomes_fault_event() {
        let (tx, rx) = unbounded();
        let pattern = Pattern::new("ffff", Position::Prefix, false);
        let pool = WorkerPool::spawn(1, &pattern, 10, |_| Exploding, tx).unwrap();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WorkerEvent::Fault { worker_id, message } => {
                assert_eq!(worker_id, 0);
                assert_eq!(message, "entropy source failed");
            }
            other => panic!("expected fault, got {:?}", other),
        }
        pool.join();
    }

    #[test]
    fn test_panic_message_fallback() {
        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "worker panicked");
    }
}
