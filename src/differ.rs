//! Day-2 differ
//!
//! Streams the day-2 log against a finished [`Day1Index`] and collects the
//! users who visited at least one product on day 2 that they had not visited
//! on day 1.

use std::io::Read;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::config::RowPolicy;
use crate::error::Result;
use crate::index::Day1Index;
use crate::row::Row;
use crate::source::DayLines;
use crate::stats::PhaseStats;

/// Qualifying user ids. Only ever grows.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResultSet {
    users: FxHashSet<String>,
}

impl ResultSet {
    /// Apply one day-2 row. Returns true if it added a new user.
    pub fn observe(&mut self, index: &Day1Index, row: Row<'_>) -> bool {
        let Some(day1_products) = index.products(row.user_id) else {
            return false;
        };
        // Already qualified; nothing this row says can change that.
        if self.users.contains(row.user_id) {
            return false;
        }
        if day1_products.contains(row.product_id) {
            return false;
        }
        self.users.insert(row.user_id.to_owned())
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    /// User ids in byte order, the order they are emitted in.
    pub fn sorted(&self) -> Vec<&str> {
        let mut users: Vec<&str> = self.iter().collect();
        users.sort_unstable();
        users
    }
}

/// Stream `lines` (day 2) and return every qualifying user.
pub fn find_returning_users<R: Read>(
    index: &Day1Index,
    lines: DayLines<R>,
    policy: RowPolicy,
    stats: &mut PhaseStats,
) -> Result<ResultSet> {
    debug!(path = %lines.path().display(), %policy, "diffing day 2");
    let mut result = ResultSet::default();
    lines.scan_rows(policy, stats, |row| {
        result.observe(index, row);
    })?;
    debug!(qualifying = result.len(), "day 2 diffed");
    Ok(result)
}
