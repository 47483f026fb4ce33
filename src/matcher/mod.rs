//! Pattern matching for Ethereum addresses.
//!
//! Patterns are anchored either at the start or the end of the 40 character
//! hex address and compare against the lowercase form or, when case
//! sensitive, the EIP-55 checksum casing.

mod pattern;

pub use pattern::{MatchResult, Pattern, Position};
