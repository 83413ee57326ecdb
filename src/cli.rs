// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
//   wikipath <cc> <from> <to> [--workers N] [--timeout SECS] [--json] ...
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "wikipath",
    version,
    about = "Find the shortest chain of links between two Wikipedia articles",
    long_about = "wikipath crawls Wikipedia breadth-first, starting at one article and following \
                  article links until it reaches the other. The chain it prints is a shortest one."
)]
pub struct Cli {
    /// Country code of the Wikipedia to crawl (e.g. en, de)
    #[arg(value_parser = parse_country_code)]
    pub cc: String,

    /// Title of the article you start with
    #[arg(value_name = "FROM")]
    pub start: String,

    /// Title of the destination article
    #[arg(value_name = "TO")]
    pub end: String,

    /// Number of pages fetched in parallel (default: number of CPUs)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Timeout for a single page request, in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Article base URL to use instead of https://<cc>.wikipedia.org/wiki/
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Print the result as JSON (disables progress lines)
    #[arg(long)]
    pub json: bool,

    /// Don't print a progress line per step
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

// Country codes are subdomains: letters, digits and '-' only
//
// This keeps input like "en.evil.com/" from ending up in the host name.
fn parse_country_code(value: &str) -> Result<String, String> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(value.to_ascii_lowercase())
    } else {
        Err(format!("'{}' is not a valid country code (e.g. en, de, simple)", value))
    }
}
