//! Run report
//!
//! Counters gathered while the two phases run. Logged at the end of every
//! successful run and optionally written as JSON (`--stats-json`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::RowPolicy;
use crate::error::{DiffError, Result};

/// Counters for one input file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseStats {
    pub path: PathBuf,
    /// Every line seen, header included.
    pub lines_read: u64,
    pub rows_accepted: u64,
    /// Invalid rows dropped under the lenient policy. Always 0 when strict.
    pub rows_skipped: u64,
    pub header_skipped: bool,
}

impl PhaseStats {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub day1: PhaseStats,
    pub day2: PhaseStats,
    /// Distinct users on day 1.
    pub users_indexed: u64,
    /// Distinct (user, product) pairs on day 1.
    pub pairs_indexed: u64,
    pub qualifying_users: u64,
    pub policy: RowPolicy,
    /// Canonical name of the encoding actually used.
    pub encoding: String,
}

impl RunStats {
    pub fn rows_skipped(&self) -> u64 {
        self.day1.rows_skipped + self.day2.rows_skipped
    }

    pub fn log_summary(&self) {
        if self.rows_skipped() > 0 {
            warn!(
                day1 = self.day1.rows_skipped,
                day2 = self.day2.rows_skipped,
                "skipped {} invalid rows",
                self.rows_skipped()
            );
        }
        info!(
            day1_rows = self.day1.rows_accepted,
            day2_rows = self.day2.rows_accepted,
            users_indexed = self.users_indexed,
            pairs_indexed = self.pairs_indexed,
            qualifying_users = self.qualifying_users,
            policy = %self.policy,
            encoding = %self.encoding,
            "run complete"
        );
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let report_err = |source: io::Error| DiffError::Report {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(report_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| report_err(e.into()))?;
        writer.write_all(b"\n").map_err(report_err)?;
        writer.flush().map_err(report_err)
    }
}
