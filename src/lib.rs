//! daydiff - returning users who discovered something new
//!
//! Reads two daily activity logs (`user_id,product_id,timestamp` per line) and
//! reports every user who appears on both days and, on day 2, visited at least
//! one product they had not visited on day 1.
//!
//! The run has two strictly ordered phases:
//!
//! 1. **Index** day 1 into user -> product set ([`index::Day1Index`]).
//! 2. **Diff** day 2 against it one row at a time ([`differ::find_returning_users`]).
//!
//! Day 2 is streamed, so memory is bounded by the size of day 1.

pub mod config;
pub mod differ;
pub mod emit;
pub mod error;
pub mod index;
pub mod row;
pub mod source;
pub mod stats;

use std::path::Path;

use encoding_rs::Encoding;
use tracing::debug;

pub use config::{Config, RowPolicy, Sink};
pub use differ::{find_returning_users, ResultSet};
pub use error::{DiffError, Result, RowDefect};
pub use index::Day1Index;
pub use row::Row;
pub use source::DayLines;
pub use stats::{PhaseStats, RunStats};

/// Run both phases and return the result set without emitting it.
pub fn compute(config: &Config) -> Result<(ResultSet, RunStats)> {
    compute_with(config, config.resolve_encoding()?)
}

fn compute_with(config: &Config, encoding: &'static Encoding) -> Result<(ResultSet, RunStats)> {
    // Both inputs must exist before either phase starts.
    ensure_readable(&config.day1)?;
    ensure_readable(&config.day2)?;

    let mut day1 = PhaseStats::new(&config.day1);
    let index = Day1Index::build(
        DayLines::open(&config.day1, encoding)?.with_header(config.skip_header),
        config.policy,
        &mut day1,
    )?;

    let mut day2 = PhaseStats::new(&config.day2);
    let result = find_returning_users(
        &index,
        DayLines::open(&config.day2, encoding)?.with_header(config.skip_header),
        config.policy,
        &mut day2,
    )?;

    let stats = RunStats {
        day1,
        day2,
        users_indexed: index.user_count() as u64,
        pairs_indexed: index.pair_count() as u64,
        qualifying_users: result.len() as u64,
        policy: config.policy,
        encoding: encoding.name().to_string(),
    };
    Ok((result, stats))
}

/// Full run: compute, write results to the configured sink, then the report.
pub fn run(config: &Config) -> Result<RunStats> {
    let encoding = config.resolve_encoding()?;
    let (result, stats) = compute_with(config, encoding)?;

    let written = emit::emit(&result, &config.sink, encoding)?;
    debug!(lines = written, sink = ?config.sink, "results written");

    stats.log_summary();
    if let Some(path) = &config.stats_json {
        stats.write_json(path)?;
    }
    Ok(stats)
}

fn ensure_readable(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| DiffError::file_access(path, e))?;
    if metadata.is_dir() {
        return Err(DiffError::file_access(
            path,
            std::io::Error::other("is a directory"),
        ));
    }
    Ok(())
}
