//! Chat Log CLI
//!
//! Thin wrapper around chatlog-core for command-line usage. Stands in for
//! the host application's event bus: it replays a recorded JSON-lines
//! event stream through the logger and leaves the per-stream log tree on
//! disk.
//!
//! ## Usage
//!
//! ```bash
//! # Replay a recorded event stream into ./logs
//! chatlog replay events.jsonl --log-dir ./logs
//!
//! # Read the stream from stdin, with direct messages included
//! cat events.jsonl | chatlog replay - --log-dir ./logs --dms
//!
//! # Use a saved config file for everything but the destination
//! chatlog replay events.jsonl --config ChatLog.json
//! ```
//!
//! Each input line is one event with the simulation clock at delivery:
//!
//! ```json
//! {"day":5,"seconds":3723,"event":{"type":"chat_sent","sender":"Ann","tag":"#town","text":"hello"}}
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use chatlog_core::{ChatLogger, GameEvent, LogConfig, WorldTime};

/// Chat log multiplexer
#[derive(Parser)]
#[command(name = "chatlog")]
#[command(version = "0.1.0")]
#[command(about = "Replay host event streams into per-stream, per-day log files")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines event stream into the log tree
    Replay {
        /// Event stream file, or "-" for stdin
        file: String,

        /// Root directory of the log tree (overrides the config file)
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Config file (JSON); defaults apply when absent
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also log direct (player to player) messages
        #[arg(long)]
        dms: bool,
    },
}

/// One line of the replay stream: clock snapshot plus event payload.
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    day: u32,
    seconds: u32,
    event: GameEvent,
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

fn open_stream(file: &str) -> Result<Box<dyn BufRead>> {
    if file == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let handle =
            File::open(file).with_context(|| format!("failed to open event stream '{file}'"))?;
        Ok(Box::new(BufReader::new(handle)))
    }
}

async fn replay(
    file: String,
    log_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    dms: bool,
) -> Result<()> {
    let mut cfg = match config {
        Some(path) => LogConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LogConfig::default(),
    };
    // Replaying is an explicit request to log.
    cfg.enabled = true;
    if dms {
        cfg.log_direct_messages = true;
    }
    if let Some(dir) = log_dir {
        cfg.chatlog_path = if dir.is_absolute() {
            dir
        } else {
            std::env::current_dir()?.join(dir)
        };
    }

    let reader = open_stream(&file)?;

    let mut logger: Option<ChatLogger> = None;
    let mut replayed = 0u64;
    let mut skipped = 0u64;

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("failed to read event stream")?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ReplayRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(line = lineno + 1, %error, "skipping malformed record");
                skipped += 1;
                continue;
            }
        };

        // The first record's day is the host's "current day" at startup.
        let logger = logger.get_or_insert_with(|| ChatLogger::new(cfg.clone(), record.day));
        logger.handle_event(WorldTime::new(record.day, record.seconds), &record.event);
        replayed += 1;
    }

    match logger {
        Some(logger) => {
            let streams = logger.router().stream_count();
            logger.shutdown();
            println!(
                "Replayed {} events ({} skipped) into {}",
                replayed,
                skipped,
                logger.config().chatlog_path.display()
            );
            println!("Streams open at shutdown: {streams}");
        }
        None => println!("No events to replay"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Replay {
            file,
            log_dir,
            config,
            dms,
        } => replay(file, log_dir, config, dms).await,
    }
}
