//! # genwalleth
//!
//! Multi-threaded Ethereum vanity wallet generator.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation, address derivation and EIP-55 casing
//! - `matcher`: Prefix/suffix pattern matching
//! - `worker`: Search workers, the thread pool and the coordinator
//! - `config`: Search and command-line configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod worker;

pub use config::{ConfigError, SearchConfig};
pub use crypto::{Address, Candidate, CandidateGenerator, KeyGenerator, Keypair};
pub use matcher::{MatchResult, Pattern, Position};
pub use worker::{
    search, CancelHandle, Progress, SearchCoordinator, SearchError, SearchOutcome, SearchResult,
};
