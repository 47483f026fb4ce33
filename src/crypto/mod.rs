//! Cryptographic operations for Ethereum key and address generation.
//!
//! This module provides:
//! - Secure random key generation using secp256k1
//! - Ethereum address derivation and EIP-55 casing using Keccak-256
//! - The `CandidateGenerator` seam used by search workers

mod address;
mod generator;
mod keypair;

pub use address::{checksum_casing, keccak256, Address, ADDRESS_HEX_LEN};
pub use generator::{Candidate, CandidateGenerator, KeyGenerator};
pub use keypair::{KeyError, Keypair};
