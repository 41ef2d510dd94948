//! kinderfrage: query the offline parenting-advice search from a terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use kinderfrage_core::config::Config;
use kinderfrage_core::{Error, ResultExt};
use kinderfrage_search::{ContentRecord, Corpus, SearchEngine, SearchOutcome, SearchSettings};
use kinderfrage_telemetry::{metrics, TelemetryConfig};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kinderfrage")]
#[command(about = "Offline fuzzy search over the Kinderfrage corpus")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to .kinderfrage.toml if present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query against a corpus
    Search {
        /// Raw query as a user would type it
        query: String,
        /// Corpus JSON file
        #[arg(long)]
        corpus: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what the sanitizer makes of a query
    Sanitize {
        query: String,
    },
    /// Show a query after sanitizing and stopword removal
    Preprocess {
        query: String,
    },
    /// Load a corpus and print the engine state
    Diagnostics {
        /// Corpus JSON file
        #[arg(long)]
        corpus: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read queries from stdin, one per line, in a single session
    Interactive {
        /// Corpus JSON file
        #[arg(long)]
        corpus: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let logging = &config.schema.logging;
    let level = if cli.verbose { "debug".to_string() } else { logging.level.clone() };
    kinderfrage_telemetry::init_with_config(&TelemetryConfig {
        log_level: level,
        json: logging.json,
        show_target: logging.show_target,
    })?;
    tracing::debug!(
        session = kinderfrage_telemetry::session_id(),
        config = ?config.path,
        "Starting"
    );

    let settings = SearchSettings::from(&config.schema);

    match cli.command {
        Commands::Search { query, corpus, json } => run_search(&query, &corpus, settings, json),
        Commands::Sanitize { query } => {
            let sanitizer = kinderfrage_search::Sanitizer::from_config(&settings.search);
            match sanitizer.sanitize(&query) {
                Some(clean) => println!("{clean}"),
                None => println!("(rejected)"),
            }
            Ok(())
        }
        Commands::Preprocess { query } => {
            let sanitizer = kinderfrage_search::Sanitizer::from_config(&settings.search);
            let processed = sanitizer
                .sanitize(&query)
                .map(|clean| kinderfrage_search::preprocess(&clean))
                .filter(|q| !q.is_empty());
            match processed {
                Some(q) => println!("{q}"),
                None => println!("(empty)"),
            }
            Ok(())
        }
        Commands::Diagnostics { corpus, json } => run_diagnostics(&corpus, settings, json),
        Commands::Interactive { corpus } => run_interactive(&corpus, settings),
    }
}

/// Load the corpus strictly so a broken file is an error here rather than
/// an empty result list.
fn open_engine(path: &Path, settings: SearchSettings) -> Result<SearchEngine> {
    if !path.exists() {
        return Err(Error::file_not_found(path).into());
    }
    let (corpus, report) = Corpus::from_path(path)
        .map_err(Error::from)
        .context(format!("While loading {}", path.display()))?;
    if !report.is_clean() {
        tracing::warn!(skipped = report.skipped.len(), "Corpus entries skipped");
    }

    let engine = SearchEngine::new(corpus, settings).with_load_report(report);
    engine.warm();
    Ok(engine)
}

fn run_search(query: &str, corpus: &Path, settings: SearchSettings, json: bool) -> Result<()> {
    let engine = open_engine(corpus, settings)?;
    let results = engine.search(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No results");
    } else {
        print_records(&results);
    }
    Ok(())
}

fn run_diagnostics(corpus: &Path, settings: SearchSettings, json: bool) -> Result<()> {
    let engine = open_engine(corpus, settings)?;
    let diagnostics = engine.diagnostics();
    let report = engine.load_report();

    if json {
        let value = serde_json::json!({
            "diagnostics": diagnostics,
            "load_report": report,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Init status:   {:?}", diagnostics.init_status);
    if let Some(error) = &diagnostics.init_error {
        println!("Init error:    {error}");
    }
    println!("Index size:    {}", diagnostics.index_size);
    println!("Skipped:       {}", diagnostics.skipped_records);
    for skipped in &report.skipped {
        println!("  #{:<4} {:?}", skipped.position, skipped.reason);
    }
    println!("Error cache:   {}", diagnostics.error_cache_size);

    let limits = &diagnostics.limits;
    println!(
        "Query limits:  {}..={} chars, {} words",
        limits.min_query_chars, limits.max_query_chars, limits.max_query_words
    );
    println!("Max results:   {}", limits.max_results);
    println!("Threshold:     {}", limits.threshold);
    println!(
        "Rate limit:    {} per {} ms",
        limits.rate_limit_max_requests, limits.rate_limit_window_ms
    );
    Ok(())
}

fn run_interactive(corpus: &Path, settings: SearchSettings) -> Result<()> {
    let engine = open_engine(corpus, settings)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim_end_matches(['\r', '\n']) {
            ":quit" | ":q" => break,
            ":reset" => {
                engine.reset();
                println!("Session state cleared");
            }
            ":stats" => {
                println!("{}", serde_json::to_string_pretty(&metrics().export_json())?);
            }
            query => match engine.search_outcome(query) {
                SearchOutcome::Hits(records) => print_records(&records),
                SearchOutcome::Empty => println!("No results"),
                SearchOutcome::Throttled => println!("Too many searches, slow down"),
                SearchOutcome::Failed => println!("Search unavailable"),
            },
        }
    }
    Ok(())
}

fn print_records(records: &[&ContentRecord]) {
    for (rank, record) in records.iter().enumerate() {
        println!("{:>2}. [{}] {}", rank + 1, record.id, record.question_text);
    }
}
