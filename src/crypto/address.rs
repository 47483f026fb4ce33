//! Ethereum address derivation and EIP-55 checksum casing.

use std::fmt;

use tiny_keccak::{Hasher, Keccak};

/// Length of an address rendered as hex, without the `0x` prefix.
pub const ADDRESS_HEX_LEN: usize = 40;

/// Computes the Keccak-256 digest of `data`.
#[inline]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    hash
}

/// Applies EIP-55 checksum casing to a 40 character lowercase hex address.
///
/// Character `i` is uppercased when nibble `i` of `keccak256(lowercase_hex)`
/// is 8 or above. Digits take up a nibble position but have no case.
pub fn checksum_casing(lowercase_hex: &str) -> String {
    let hash = keccak256(lowercase_hex.as_bytes());

    lowercase_hex
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let hash_byte = hash[i / 2];
            let hash_nibble = if i % 2 == 0 {
                hash_byte >> 4
            } else {
                hash_byte & 0x0f
            };

            if hash_nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

/// An Ethereum address (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Creates an address from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derives the address of an uncompressed public key given without its
    /// leading `0x04` format byte.
    ///
    /// The address is the last 20 bytes of `keccak256(public_key)`.
    #[inline]
    pub fn from_public_key(public_key: &[u8; 64]) -> Self {
        let hash = keccak256(public_key);

        let mut address_bytes = [0u8; 20];
        address_bytes.copy_from_slice(&hash[12..]);

        Self(address_bytes)
    }

    /// Returns the address as a lowercase hex string (without 0x prefix).
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the address with 0x prefix.
    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// Returns the EIP-55 checksum casing without 0x prefix.
    pub fn to_checksum_hex(&self) -> String {
        checksum_casing(&self.to_hex())
    }

    /// Returns the address with checksum encoding (EIP-55) and 0x prefix.
    pub fn to_checksum(&self) -> String {
        format!("0x{}", self.to_checksum_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn address_from_hex(hex_str: &str) -> Address {
        let bytes: [u8; 20] = hex::decode(hex_str).unwrap().try_into().unwrap();
        Address::from_bytes(bytes)
    }

    #[test]
    fn test_checksum_address() {
        // Test vectors from EIP-55
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
            "0x52908400098527886E0F7030069857D2E4169EE7",
            "0xde709f2102306220921060314715629080e2fb77",
        ] {
            let addr = address_from_hex(&expected[2..].to_lowercase());
            assert_eq!(addr.to_checksum(), expected);
        }
    }

    #[test]
    fn test_hex_output() {
        let addr = Address::from_bytes([0u8; 20]);
        assert_eq!(addr.to_hex(), "0000000000000000000000000000000000000000");
        assert_eq!(
            addr.to_hex_prefixed(),
            "0x0000000000000000000000000000000000000000"
        );
        // No letters, so the checksum casing is the plain hex
        assert_eq!(addr.to_checksum_hex(), addr.to_hex());
    }

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    proptest! {
        #[test]
        fn test_derivation_is_deterministic(bytes in prop::collection::vec(any::<u8>(), 64)) {
            let public_key: [u8; 64] = bytes.try_into().unwrap();
            let first = Address::from_public_key(&public_key);
            let second = Address::from_public_key(&public_key);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.to_checksum_hex(), second.to_checksum_hex());
        }

        #[test]
        fn test_checksum_only_changes_case(bytes in any::<[u8; 20]>()) {
            let addr = Address::from_bytes(bytes);
            let lower = addr.to_hex();
            let checksum = addr.to_checksum_hex();
            prop_assert_eq!(lower.len(), ADDRESS_HEX_LEN);
            prop_assert_eq!(checksum.to_lowercase(), lower);
        }
    }
}
