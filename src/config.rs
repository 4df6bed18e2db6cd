//! Run configuration
//!
//! The CLI builds a [`Config`]; the library never reads arguments or the
//! environment itself.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use encoding_rs::Encoding;
use serde::Serialize;

use crate::error::{DiffError, Result};

/// Default `--encoding` label.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// What to do with a line that is not a valid row.
///
/// The same policy applies to both days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Abort the run on the first invalid row.
    #[default]
    Strict,
    /// Skip invalid rows, log each one, and report the totals at the end.
    Lenient,
}

impl fmt::Display for RowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowPolicy::Strict => f.write_str("strict"),
            RowPolicy::Lenient => f.write_str("lenient"),
        }
    }
}

/// Where the result lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub day1: PathBuf,
    pub day2: PathBuf,
    pub sink: Sink,
    /// WHATWG label, e.g. `utf-8`, `latin1`, `utf-16le`.
    pub encoding: String,
    pub policy: RowPolicy,
    /// Ignore line 1 of each input without validating it.
    pub skip_header: bool,
    pub stats_json: Option<PathBuf>,
}

impl Config {
    /// Config with defaults: stdout, UTF-8, strict, no header.
    pub fn new(day1: impl Into<PathBuf>, day2: impl Into<PathBuf>) -> Self {
        Self {
            day1: day1.into(),
            day2: day2.into(),
            sink: Sink::Stdout,
            encoding: DEFAULT_ENCODING.to_string(),
            policy: RowPolicy::default(),
            skip_header: false,
            stats_json: None,
        }
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.sink = Sink::File(path.into());
        self
    }

    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    pub fn with_policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_header(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }

    pub fn with_stats_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.stats_json = Some(path.into());
        self
    }

    /// Resolve the encoding label, failing before any file is touched.
    pub fn resolve_encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| DiffError::UnknownEncoding(self.encoding.clone()))
    }
}
