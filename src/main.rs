//! Ethereum Vanity Wallet Generator CLI
//!
//! Usage:
//!   genwalleth                 # Generate one random wallet
//!   genwalleth -i dead         # Find address ending with "dead"
//!   genwalleth -i beef -p      # Find address starting with "beef"
//!   genwalleth -i BeeF -p -s   # Match the EIP-55 checksum casing
//!   genwalleth -i cafe -j      # Print the result as JSON

use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use genwalleth::config::Config;
use genwalleth::{Progress, SearchCoordinator, SearchOutcome, SearchResult};

const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Exit status after Ctrl+C, following the shell's 128 + SIGINT convention.
const EXIT_CANCELLED: i32 = 130;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::parse();
    let coordinator = SearchCoordinator::new(config.search_config())?;

    let cancel = coordinator.cancel_handle();
    ctrlc::set_handler(move || cancel.cancel()).context("Error setting Ctrl-C handler")?;

    if !config.json && !coordinator.pattern().is_empty() {
        write_header(&mut io::stderr().lock(), &coordinator)?;
    }

    let json = config.json;
    let outcome = coordinator.run(|progress| {
        if !json {
            print_progress(progress);
        }
    })?;

    match outcome {
        SearchOutcome::Found(result) => {
            if json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                clear_line();
                print_result(&result);
            }
            Ok(())
        }
        SearchOutcome::Cancelled => {
            if !json {
                clear_line();
                println!("Stopped by user.");
            }
            process::exit(EXIT_CANCELLED);
        }
    }
}

/// Writes the search summary. Goes to stderr with the progress line so that
/// stdout carries only the result.
fn write_header(out: &mut impl Write, coordinator: &SearchCoordinator) -> io::Result<()> {
    let pattern = coordinator.pattern();
    writeln!(out, "Pattern:    {} ({})", pattern.pattern(), pattern.position())?;
    writeln!(out, "Difficulty: {}", pattern.difficulty_description())?;
    writeln!(out, "Workers:    {}", coordinator.worker_count())?;
    writeln!(out)
}

fn print_progress(progress: &Progress) {
    let mut stderr = io::stderr().lock();
    let _ = write!(
        stderr,
        "\r{CYAN}Attempts:{RESET} {GREEN}{}{RESET} {DIM}|{RESET} \
         {CYAN}Speed:{RESET} {GREEN}{}/s{RESET} {DIM}|{RESET} \
         {CYAN}Time:{RESET} {GREEN}{:.2}s{RESET} {DIM}| Ctrl + C for exit{RESET}",
        format_number(progress.total_attempts),
        format_number(progress.keys_per_second() as u64),
        progress.elapsed.as_secs_f64(),
    );
    let _ = stderr.flush();
}

fn clear_line() {
    let mut stderr = io::stderr().lock();
    let _ = write!(stderr, "\r\x1b[2K");
    let _ = stderr.flush();
}

fn print_result(result: &SearchResult) {
    let rows = [
        ("Address", format!("{YELLOW}{}{RESET}", result.address)),
        ("Private key", result.private_key.clone()),
        ("Public key", result.public_key.clone()),
        ("Attempts", format_number(result.total_attempts)),
        ("Execution time", format!("{:.2}s", result.elapsed_seconds)),
        ("Workers", result.worker_count.to_string()),
    ];

    for (key, value) in rows {
        println!("{CYAN}* {key}:{RESET} {GREEN}{value}{RESET}");
    }
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
