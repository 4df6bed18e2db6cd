//! Row parsing
//!
//! A row is `user_id,product_id,timestamp`: exactly three comma-separated
//! fields, each trimmed. No quoting, so a comma is always a delimiter.

use memchr::memchr_iter;

use crate::error::RowDefect;

pub const FIELD_COUNT: usize = 3;

/// One parsed activity row, borrowing from the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a> {
    pub user_id: &'a str,
    pub product_id: &'a str,
    /// Carried through but never interpreted.
    pub timestamp: &'a str,
}

impl<'a> Row<'a> {
    /// Parse a single line (without its terminator).
    ///
    /// Blank lines have one empty field and are rejected like any other
    /// wrong field count.
    pub fn parse(line: &'a str) -> Result<Self, RowDefect> {
        let mut commas = memchr_iter(b',', line.as_bytes());
        let (first, second) = match (commas.next(), commas.next()) {
            (Some(first), Some(second)) => (first, second),
            (Some(_), None) => return Err(RowDefect::FieldCount(2)),
            _ => return Err(RowDefect::FieldCount(1)),
        };
        let extra = commas.count();
        if extra > 0 {
            return Err(RowDefect::FieldCount(FIELD_COUNT + extra));
        }

        let user_id = line[..first].trim();
        let product_id = line[first + 1..second].trim();
        let timestamp = line[second + 1..].trim();

        if user_id.is_empty() {
            return Err(RowDefect::EmptyUser);
        }
        if product_id.is_empty() {
            return Err(RowDefect::EmptyProduct);
        }

        Ok(Row {
            user_id,
            product_id,
            timestamp,
        })
    }
}
