// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) on stderr
// 3. Build the start and target article URLs
// 4. Run the breadth-first crawl, printing one progress line per step
// 5. Print the route and exit with proper code
//    (0 = route found, 1 = no route, 2 = error)
// =============================================================================

mod cli;   // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - the breadth-first crawl engine
mod error; // src/error.rs - error types
mod wiki;  // src/wiki/ - Wikipedia URLs, HTML parsing, HTTP

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use cli::Cli;
use crawl::{format_route, CrawlConfig, CrawlOutcome, Crawler, ProgressReporter, StepRecord};
use wiki::{article_url, wiki_base, HttpConfig, HttpFetcher};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = route found
//   Ok(1) = no route found
//   Err   = anything else (bad arguments, unreachable target, ...)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base = match &cli.base_url {
        Some(url) => Url::parse(url).with_context(|| format!("invalid --base-url '{}'", url))?,
        None => wiki_base(&cli.cc)?,
    };
    let start = article_url(&base, &cli.start).context("invalid start article")?;
    let target = article_url(&base, &cli.end).context("invalid destination article")?;

    let fetcher = HttpFetcher::new(&HttpConfig {
        timeout: Duration::from_secs(cli.timeout),
        ..HttpConfig::default()
    })?;

    let mut config = CrawlConfig::default();
    if let Some(workers) = cli.workers {
        config.workers = workers.into();
    }

    let crawler = Crawler::new(fetcher, config);
    let show_progress = !cli.quiet && !cli.json;
    let reporter = ProgressReporter::for_terminal();

    let outcome = crawler
        .find_route(&start, &target, |record: &StepRecord| {
            if show_progress {
                reporter.report(record);
            }
        })
        .await
        .with_context(|| format!("crawl from '{}' to '{}' failed", cli.start, cli.end))?;

    info!(
        steps = outcome.steps(),
        pages = crawler.registry().len(),
        "crawl finished"
    );

    if cli.json {
        print_json(&cli, &outcome)?;
        if outcome.route().is_none() {
            // stdout holds the JSON document; the notice goes to stderr
            eprintln!("{}", route_line(&outcome));
        }
    } else {
        print_route(&outcome, show_progress);
    }

    Ok(exit_code(&outcome))
}

// 0 = route found, 1 = no route
fn exit_code(outcome: &CrawlOutcome) -> i32 {
    match outcome {
        CrawlOutcome::Found { .. } => 0,
        CrawlOutcome::NoRoute { .. } => 1,
    }
}

// The final answer line: "A -> B -> C", or the no-route notice
fn route_line(outcome: &CrawlOutcome) -> String {
    match outcome.route() {
        Some(route) => format_route(route),
        None => "No route found".to_string(),
    }
}

// Logs go to stderr so they never mix with the route on stdout.
// RUST_LOG wins over --verbose when set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_route(outcome: &CrawlOutcome, after_progress: bool) {
    if after_progress {
        // Separate the answer from the last progress line
        println!();
    }

    println!("{}", route_line(outcome));
}

// Shape of the --json output
#[derive(Serialize)]
struct JsonResult<'a> {
    from: &'a str,
    to: &'a str,
    route: Option<&'a [String]>,
    hops: Option<usize>,
    steps: usize,
}

fn print_json(cli: &Cli, outcome: &CrawlOutcome) -> Result<()> {
    let route = outcome.route();
    let result = JsonResult {
        from: &cli.start,
        to: &cli.end,
        route,
        hops: route.map(|r| r.len().saturating_sub(1)),
        steps: outcome.steps(),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
