//! Pattern matching implementation.

use crate::crypto::{checksum_casing, Address};

/// Where in the address the pattern must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Match at the beginning of the address
    Prefix,
    /// Match at the end of the address
    #[default]
    Suffix,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Prefix => write!(f, "prefix"),
            Position::Suffix => write!(f, "suffix"),
        }
    }
}

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// A normalized pattern ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// The pattern string, lowercased unless case sensitive
    pattern: String,
    /// Where the pattern must appear
    position: Position,
    /// Whether matching is against the EIP-55 casing
    case_sensitive: bool,
}

impl Pattern {
    /// Creates a new pattern.
    pub fn new(pattern: impl Into<String>, position: Position, case_sensitive: bool) -> Self {
        let pattern = pattern.into();
        let pattern = if case_sensitive {
            pattern
        } else {
            pattern.to_lowercase()
        };

        Self {
            pattern,
            position,
            case_sensitive,
        }
    }

    /// Returns the pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the pattern position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns whether matching is case sensitive.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Returns true if the pattern accepts every address.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Matches an address, given as lowercase hex, against this pattern.
    ///
    /// Case-sensitive patterns compare against `checksum_hex`; when the
    /// caller has not computed it, it is derived from `lowercase_hex`.
    #[inline]
    pub fn matches(&self, lowercase_hex: &str, checksum_hex: Option<&str>) -> MatchResult {
        if self.pattern.is_empty() {
            return MatchResult::Match;
        }

        let computed;
        let haystack = if self.case_sensitive {
            match checksum_hex {
                Some(checksum) => checksum,
                None => {
                    computed = checksum_casing(lowercase_hex);
                    computed.as_str()
                }
            }
        } else {
            lowercase_hex
        };

        let matched = match self.position {
            Position::Prefix => haystack.starts_with(&self.pattern),
            Position::Suffix => haystack.ends_with(&self.pattern),
        };

        if matched {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }

    /// Matches an address against this pattern.
    pub fn matches_address(&self, address: &Address) -> MatchResult {
        self.matches(&address.to_hex(), None)
    }

    /// Returns the estimated difficulty (number of attempts to find a match).
    ///
    /// Each hex character has 16 possible values. With case-sensitive
    /// matching every letter also has to land on the right case, which
    /// doubles the expected attempts per letter.
    pub fn estimated_difficulty(&self) -> u64 {
        let base = 16u64.saturating_pow(self.pattern.len() as u32);
        if !self.case_sensitive {
            return base;
        }

        let letters = self
            .pattern
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .count();
        base.saturating_mul(2u64.saturating_pow(letters as u32))
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}
