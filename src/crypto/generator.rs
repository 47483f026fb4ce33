//! Random candidate generation.

use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{Secp256k1, SignOnly};

use super::{Address, Keypair};

/// One generated keypair together with its derived address.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The keypair
    pub keypair: Keypair,
    /// Address derived from the keypair's public key
    pub address: Address,
    /// EIP-55 casing of `address`, present only when the generator was asked
    /// to compute it
    pub checksum: Option<String>,
}

/// A source of candidate keypairs.
///
/// Each worker owns its own generator, so implementations need `Send` but
/// not `Sync`.
pub trait CandidateGenerator: Send {
    /// Produces the next candidate.
    fn generate(&mut self) -> Candidate;
}

/// Generates keypairs from operating system entropy.
pub struct KeyGenerator {
    secp: Secp256k1<SignOnly>,
    with_checksum: bool,
}

impl KeyGenerator {
    /// Creates a generator. `with_checksum` controls whether the EIP-55
    /// casing is computed for every candidate, which only case-sensitive
    /// searches need.
    pub fn new(with_checksum: bool) -> Self {
        Self {
            secp: Secp256k1::signing_only(),
            with_checksum,
        }
    }
}

impl CandidateGenerator for KeyGenerator {
    fn generate(&mut self) -> Candidate {
        // Zero or out-of-range scalars are drawn with negligible probability;
        // draw again rather than surface them.
        let keypair = loop {
            let mut secret = [0u8; 32];
            OsRng.fill_bytes(&mut secret);

            if let Ok(keypair) = Keypair::derive(&self.secp, secret) {
                break keypair;
            }
        };

        let address = keypair.address();
        let checksum = self.with_checksum.then(|| address.to_checksum_hex());

        Candidate {
            keypair,
            address,
            checksum,
        }
    }
}
