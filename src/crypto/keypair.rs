//! Ethereum keypair derivation.

use std::fmt;

use secp256k1::{PublicKey, Secp256k1, SecretKey, Signing};

use super::Address;

/// Errors raised when deriving a keypair from caller-supplied bytes.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(#[from] secp256k1::Error),
}

/// A secp256k1 keypair in raw byte form.
///
/// The public key is the uncompressed point without its leading `0x04`
/// format byte, which is the form Ethereum hashes into an address.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    /// The private key bytes (32 bytes)
    secret_key: [u8; 32],
    /// Uncompressed public key coordinates (x || y)
    public_key: [u8; 64],
}

impl Keypair {
    /// Derives a keypair from an existing secret key.
    pub fn from_secret_key(secret_bytes: [u8; 32]) -> Result<Self, KeyError> {
        Self::derive(&Secp256k1::signing_only(), secret_bytes)
    }

    /// Derives a keypair using an existing signing context.
    ///
    /// Fails for the zero scalar and for scalars at or above the curve order.
    pub(crate) fn derive<C: Signing>(
        secp: &Secp256k1<C>,
        secret_bytes: [u8; 32],
    ) -> Result<Self, KeyError> {
        let secret_key = SecretKey::from_slice(&secret_bytes)?;
        let serialized = PublicKey::from_secret_key(secp, &secret_key).serialize_uncompressed();

        let mut public_key = [0u8; 64];
        public_key.copy_from_slice(&serialized[1..]);

        Ok(Self {
            secret_key: secret_bytes,
            public_key,
        })
    }

    /// Builds a keypair from raw parts without checking that they belong
    /// together.
    pub fn from_parts(secret_key: [u8; 32], public_key: [u8; 64]) -> Self {
        Self {
            secret_key,
            public_key,
        }
    }

    /// Returns the private key as a hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key)
    }

    /// Returns the private key bytes.
    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.secret_key
    }

    /// Returns the public key as a hex string (without 0x prefix).
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    /// Returns the public key bytes.
    pub fn public_key_bytes(&self) -> &[u8; 64] {
        &self.public_key
    }

    /// Derives the Ethereum address of this keypair's public key.
    #[inline]
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}
