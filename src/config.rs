//! Runtime configuration for the vanity address search.

use std::time::Duration;

use clap::Parser;

use crate::crypto::ADDRESS_HEX_LEN;
use crate::matcher::{Pattern, Position};

/// Keypairs each worker tests between progress reports.
pub const DEFAULT_BATCH_SIZE: u64 = 1000;

/// How often progress snapshots are handed to the renderer.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_millis(200);

/// Upper bound on workers, as a multiple of the available CPUs.
pub const MAX_WORKERS_PER_CPU: usize = 4;

/// Clamps a requested worker count to `1..=MAX_WORKERS_PER_CPU * cpus`.
pub fn clamp_workers(requested: usize) -> usize {
    let max = num_cpus::get().max(1) * MAX_WORKERS_PER_CPU;
    requested.clamp(1, max)
}

/// Parameters of a single search. Shared read-only by every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Hex pattern; empty means "accept the first keypair"
    pub pattern: String,
    /// Compare against the EIP-55 casing instead of lowercase hex
    pub case_sensitive: bool,
    /// Where the pattern must appear
    pub position: Position,
    /// Requested number of worker threads
    pub worker_count: usize,
    /// Keypairs tested between progress reports
    pub batch_size: u64,
    /// Interval between progress snapshots
    pub report_interval: Duration,
}

impl SearchConfig {
    /// Creates a configuration with one worker per CPU and default batching.
    pub fn new(pattern: impl Into<String>, position: Position, case_sensitive: bool) -> Self {
        Self {
            pattern: pattern.into(),
            case_sensitive,
            position,
            worker_count: num_cpus::get(),
            batch_size: DEFAULT_BATCH_SIZE,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_report_interval(mut self, report_interval: Duration) -> Self {
        self.report_interval = report_interval;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.pattern.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidPattern(
                "Pattern must contain only hex characters (0-9, a-f)".into(),
            ));
        }

        if self.pattern.len() > ADDRESS_HEX_LEN {
            return Err(ConfigError::InvalidPattern(
                "Pattern cannot be longer than 40 characters (full address)".into(),
            ));
        }

        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }

        if self.report_interval.is_zero() {
            return Err(ConfigError::InvalidReportInterval);
        }

        Ok(())
    }

    /// Returns the pattern normalized for matching.
    pub fn compiled_pattern(&self) -> Pattern {
        Pattern::new(self.pattern.clone(), self.position, self.case_sensitive)
    }

    /// Returns the number of workers a search will actually spawn.
    pub fn effective_workers(&self) -> usize {
        clamp_workers(self.worker_count)
    }
}

/// Ethereum vanity wallet generator
#[derive(Parser, Debug, Clone)]
#[command(name = "genwalleth", author, version, about, long_about = None)]
pub struct Config {
    /// Hex characters (0-9, a-f) to search for; empty generates one wallet
    #[arg(short = 'i', long = "input", default_value = "")]
    pub input: String,

    /// Case sensitive mode (matches the EIP-55 checksum casing)
    #[arg(short = 's', long)]
    pub sensitive: bool,

    /// Search at the beginning of the address (suffix by default)
    #[arg(short = 'p', long)]
    pub prefix: bool,

    /// Print the result as JSON
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Progress report interval in milliseconds
    #[arg(short = 'r', long, default_value = "200")]
    pub report_interval: u64,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Returns where the pattern must appear.
    pub fn position(&self) -> Position {
        if self.prefix {
            Position::Prefix
        } else {
            Position::Suffix
        }
    }

    /// Builds the search configuration for these arguments.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.input.clone(), self.position(), self.sensitive)
            .with_workers(self.worker_count())
            .with_report_interval(Duration::from_millis(self.report_interval))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Report interval must be greater than zero")]
    InvalidReportInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config(pattern: &str) -> SearchConfig {
        SearchConfig::new(pattern, Position::Suffix, false).with_workers(2)
    }

    #[test]
    fn test_valid_pattern() {
        assert!(make_test_config("dead").validate().is_ok());
        assert!(make_test_config("DeAd01").validate().is_ok());
    }

    #[test]
    fn test_empty_pattern_is_valid() {
        assert!(make_test_config("").validate().is_ok());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            make_test_config("xyz").validate(),
            Err(ConfigError::InvalidPattern(_))
        ));
        assert!(make_test_config("0xdead").validate().is_err());
    }

    #[test]
    fn test_pattern_length_limit() {
        assert!(make_test_config(&"a".repeat(40)).validate().is_ok());
        assert!(make_test_config(&"a".repeat(41)).validate().is_err());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(matches!(
            make_test_config("a").with_workers(0).validate(),
            Err(ConfigError::InvalidWorkerCount)
        ));
        assert!(matches!(
            make_test_config("a").with_batch_size(0).validate(),
            Err(ConfigError::InvalidBatchSize)
        ));
        assert!(matches!(
            make_test_config("a")
                .with_report_interval(Duration::ZERO)
                .validate(),
            Err(ConfigError::InvalidReportInterval)
        ));
    }

    #[test]
    fn test_worker_clamp() {
        let max = num_cpus::get() * MAX_WORKERS_PER_CPU;
        assert_eq!(clamp_workers(0), 1);
        assert_eq!(clamp_workers(1), 1);
        assert_eq!(clamp_workers(usize::MAX), max);
    }

    #[test]
    fn test_cli_flags() {
        let config = Config::parse_from(["genwalleth", "-i", "BEEF", "-s", "-p", "-w", "3"]);
        let search = config.search_config();
        assert_eq!(search.pattern, "BEEF");
        assert!(search.case_sensitive);
        assert_eq!(search.position, Position::Prefix);
        assert_eq!(search.worker_count, 3);
        assert_eq!(search.report_interval, DEFAULT_REPORT_INTERVAL);
    }

    #[test]
    fn test_cli_defaults() {
        let config = Config::parse_from(["genwalleth"]);
        assert!(config.input.is_empty());
        assert!(!config.json);
        assert_eq!(config.position(), Position::Suffix);
    }
}
