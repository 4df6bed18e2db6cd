//! Day-1 index: user_id -> set of product_ids visited that day
//!
//! Built in one pass over the day-1 log and never modified afterwards; the
//! differ only ever sees it through `&Day1Index`.

use std::io::Read;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::config::RowPolicy;
use crate::error::Result;
use crate::source::DayLines;
use crate::stats::PhaseStats;

pub type ProductSet = FxHashSet<String>;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Day1Index {
    users: FxHashMap<String, ProductSet>,
}

impl Day1Index {
    /// Consume the whole day-1 source and build the index.
    ///
    /// Duplicate (user, product) rows are absorbed by the set.
    pub fn build<R: Read>(lines: DayLines<R>, policy: RowPolicy, stats: &mut PhaseStats) -> Result<Self> {
        debug!(path = %lines.path().display(), %policy, "indexing day 1");
        let mut index = Self::default();
        lines.scan_rows(policy, stats, |row| index.insert(row.user_id, row.product_id))?;
        debug!(
            users = index.user_count(),
            pairs = index.pair_count(),
            "day 1 indexed"
        );
        Ok(index)
    }

    fn insert(&mut self, user_id: &str, product_id: &str) {
        // Only allocate for keys we have not seen.
        match self.users.get_mut(user_id) {
            Some(products) => {
                if !products.contains(product_id) {
                    products.insert(product_id.to_owned());
                }
            }
            None => {
                let mut products = ProductSet::default();
                products.insert(product_id.to_owned());
                self.users.insert(user_id.to_owned(), products);
            }
        }
    }

    /// Products `user_id` visited on day 1, if the user appeared at all.
    pub fn products(&self, user_id: &str) -> Option<&ProductSet> {
        self.users.get(user_id)
    }

    /// Distinct users (U1).
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Distinct (user, product) pairs (P1).
    pub fn pair_count(&self) -> usize {
        self.users.values().map(|products| products.len()).sum()
    }
}

#[cfg(test)]
impl Day1Index {
    fn contains_user(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    fn visited(&self, user_id: &str, product_id: &str) -> bool {
        self.products(user_id)
            .is_some_and(|products| products.contains(product_id))
    }

    fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
