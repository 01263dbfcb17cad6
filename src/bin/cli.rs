//
// SPDX-License-Identifier: Apache-2.0 OR MIT
//
//! CLI for generating and checking quad-block input files.
//!
//! Examples:
//! ```bash
//! quadgen                                  # full sweep: input_16.dat .. input_16777216.dat
//! quadgen --max-messages 4096 -o data/     # first 9 files of the sweep into data/
//! quadgen --seed 42 generate 1024          # one reproducible file, input_1024.dat
//! quadgen verify data/input_*.dat          # check block layout of written files
//! quadgen inspect input_16.dat --blocks 2  # hex view of the first two blocks
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quadgen::{
    constants::{DEFAULT_MESSAGE_LEN, DEFAULT_PROGRESS_INTERVAL},
    generate_for_messages, read_head, run_sweep, verify_file, write_input_file,
    blocks_for_messages, BlockGenerator, Config, ProgressOptions,
};

/// Macro to safely print with broken pipe handling
macro_rules! safe_println {
    ($($arg:tt)*) => {
        match writeln!(io::stdout(), $($arg)*) {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                // Gracefully exit on broken pipe (e.g., when piped to head/tail)
                std::process::exit(0);
            }
            Err(e) => return Err(e.into())
        }
    };
}

// -- Commands

#[derive(Parser)]
#[command(name = "quadgen", author, version, about)]
struct Cli {
    /// Increase log verbosity: -v = Debug, -vv = Trace (default Info)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Directory the input_<n>.dat files are written to
    #[arg(short = 'o', long, env = "QUADGEN_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// RNG seed for reproducible output (system entropy if omitted)
    #[arg(short = 's', long, env = "QUADGEN_SEED")]
    seed: Option<u64>,

    /// Payload bytes per slot (1..=31)
    #[arg(long, default_value_t = DEFAULT_MESSAGE_LEN as usize)]
    message_len: usize,

    /// Comma separated message counts, replacing the default 16..16777216 sweep
    #[arg(long, value_delimiter = ',')]
    messages: Option<Vec<u64>>,

    /// Skip sweep entries larger than this many messages
    #[arg(long)]
    max_messages: Option<u64>,

    /// Log a progress line every N blocks
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: u64,

    /// Draw a progress bar while writing
    #[arg(long)]
    progress: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write the file for a single message count.
    Generate {
        /// Number of messages (must be a multiple of 4)
        n_msg: u64,

        /// Output path (default: <output-dir>/input_<n_msg>.dat)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check that files are whole blocks with well-formed slots.
    Verify {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Accept any length byte up to 31 instead of --message-len
        #[arg(long)]
        any_length: bool,
    },

    /// Print the slots of the first blocks of a file in hex.
    Inspect {
        file: PathBuf,

        /// Number of blocks to show
        #[arg(short = 'b', long, default_value_t = 1)]
        blocks: usize,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config {
            output_dir: self.output_dir.clone(),
            seed: self.seed,
            message_len: self.message_len,
            progress: ProgressOptions {
                interval: self.progress_interval,
                show_bar: self.progress,
            },
            ..Config::default()
        };
        if let Some(counts) = &self.messages {
            config.message_counts = counts.clone();
        }
        match self.max_messages {
            Some(max) => config.with_max_messages(max),
            None => config,
        }
    }
}

/// Default filter when `RUST_LOG` is unset
fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";      // -q: WARN level
    }
    match verbose {
        0 => "info",        // no -v: INFO level, sweep progress is visible
        1 => "debug",       // -v: DEBUG level
        _ => "trace",       // -vv or more: TRACE level
    }
}

/// Main CLI function
fn main() -> Result<()> {
    // Loads any variables from .env file that are not already set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbosity; its default
    // `tracing-log` feature also bridges `log` records from dependencies
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose, cli.quiet))))
        .with_target(false)
        .init();

    let config = cli.config();
    config.validate()?;

    match &cli.cmd {
        None => {
            if config.message_counts.is_empty() {
                warn!("No message counts left to generate");
                return Ok(());
            }
            let mut generator = make_generator(&config)?;
            let start = Instant::now();
            let summaries = run_sweep(&config, &mut generator)?;
            let total: u64 = summaries.iter().map(|s| s.bytes).sum();
            info!(
                "Sweep complete: {} files, {} bytes in {}",
                summaries.len(),
                total,
                humantime::format_duration(Duration::from_secs(start.elapsed().as_secs()))
            );
        }

        Some(Command::Generate { n_msg, output }) => generate_cmd(&config, *n_msg, output.clone())?,

        Some(Command::Verify { files, any_length }) => {
            let expected = (!any_length).then_some(config.message_len as u8);
            for file in files {
                let report = verify_file(file, expected)?;
                safe_println!(
                    "{}: OK, {} blocks, {} messages, {} bytes",
                    report.path.display(),
                    report.blocks,
                    report.messages,
                    report.bytes
                );
            }
        }

        Some(Command::Inspect { file, blocks }) => inspect_cmd(file, *blocks)?,
    }

    Ok(())
}

fn make_generator(config: &Config) -> Result<BlockGenerator> {
    let generator = BlockGenerator::new(config.seed).with_message_len(config.message_len)?;
    if config.seed.is_none() {
        // log the drawn seed so an unseeded run can be replayed with --seed
        info!("Using random seed {}", generator.seed().unwrap_or_default());
    }
    Ok(generator)
}

fn generate_cmd(config: &Config, n_msg: u64, output: Option<PathBuf>) -> Result<()> {
    let single = Config {
        message_counts: vec![n_msg],
        ..config.clone()
    };
    single.validate()?;

    let mut generator = make_generator(&single)?;
    let summary = match output {
        Some(path) => {
            let num_blocks = blocks_for_messages(n_msg);
            info!(
                "Generating {} with {} blocks ({} messages)",
                path.display(),
                num_blocks,
                n_msg
            );
            write_input_file(&path, num_blocks, &mut generator, single.progress)?
        }
        None => {
            std::fs::create_dir_all(&single.output_dir).with_context(|| {
                format!("failed to create output directory {}", single.output_dir.display())
            })?;
            generate_for_messages(&single.output_dir, n_msg, &mut generator, single.progress)?
        }
    };
    info!("Wrote {} bytes to {}", summary.bytes, summary.path.display());
    Ok(())
}

fn inspect_cmd(file: &Path, count: usize) -> Result<()> {
    let report = read_head(file, count)?;
    safe_println!("{}", report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_levels() {
        assert_eq!(log_filter(0, false), "info");
        assert_eq!(log_filter(1, false), "debug");
        assert_eq!(log_filter(2, false), "trace");
        assert_eq!(log_filter(5, false), "trace");
        assert_eq!(log_filter(0, true), "warn");
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let cli = Cli::try_parse_from(["quadgen", "-vv"]).unwrap();
        assert_eq!(log_filter(cli.verbose, cli.quiet), "trace");

        let cli = Cli::try_parse_from(["quadgen", "-q", "inspect", "input_16.dat"]).unwrap();
        assert_eq!(log_filter(cli.verbose, cli.quiet), "warn");

        assert!(Cli::try_parse_from(["quadgen", "-q", "-v"]).is_err());
    }
}
