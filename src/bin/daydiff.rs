//! daydiff CLI tool
//!
//! Command-line interface for finding returning users with new product visits

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use daydiff::config::DEFAULT_ENCODING;
use daydiff::{Config, RowPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "daydiff")]
#[command(about = "Find users who visited a new product on day 2 that they had not visited on day 1")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two daily logs and print qualifying user ids, one per line
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Day 1 log (user_id,product_id,timestamp per line)
    day1: PathBuf,
    /// Day 2 log (user_id,product_id,timestamp per line)
    day2: PathBuf,
    /// Write result lines to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Encoding for reading inputs and writing output (WHATWG label)
    #[arg(long, env = "DAYDIFF_ENCODING", default_value = DEFAULT_ENCODING)]
    encoding: String,
    /// What to do with lines that are not valid rows
    #[arg(long, value_enum, env = "DAYDIFF_INVALID_ROWS", default_value_t = RowPolicy::Strict)]
    invalid_rows: RowPolicy,
    /// Ignore the first line of each input file
    #[arg(long, env = "DAYDIFF_SKIP_HEADER")]
    skip_header: bool,
    /// Write a JSON run report to this file
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

impl From<RunArgs> for Config {
    fn from(args: RunArgs) -> Self {
        let mut config = Config::new(args.day1, args.day2)
            .with_encoding(args.encoding)
            .with_policy(args.invalid_rows)
            .with_header(args.skip_header);
        if let Some(output) = args.output {
            config = config.with_output(output);
        }
        if let Some(stats_json) = args.stats_json {
            config = config.with_stats_json(stats_json);
        }
        config
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("daydiff=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    // Optional env file (encoding / policy defaults) - loaded before clap parses
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = Config::from(args);
            daydiff::run(&config).with_context(|| {
                format!(
                    "daydiff run failed ({} vs {})",
                    config.day1.display(),
                    config.day2.display()
                )
            })?;
        }
    }

    Ok(())
}
