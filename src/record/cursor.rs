//! Pagination cursor and boundary arithmetic
//!
//! The upstream endpoint pages backwards in time: the cursor of the next
//! request is the creation timestamp of the oldest record seen so far. Whether
//! the endpoint includes the record sitting exactly on that boundary is not
//! documented, so both interpretations are supported.

use crate::{FeedwalkError, Result};
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout used by the upstream, e.g. `2024-03-01T09:15:42.123+0800`
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Opaque pagination token, equal to (or derived from) a record timestamp
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds a cursor from a user-supplied timestamp, rejecting values the
    /// endpoint would not understand
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        match parse_timestamp(value) {
            Some(_) => Ok(Self::new(value)),
            None => Err(FeedwalkError::InvalidCursor(format!(
                "'{}' is not a timestamp like 2024-03-01T09:15:42.123+0800",
                value
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the upstream treats the record whose timestamp equals the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorBoundary {
    /// The boundary record is returned again; the seen-set absorbs it
    #[default]
    Inclusive,

    /// The boundary record is excluded; the cursor is moved back by one
    /// millisecond so records sharing the boundary timestamp are not lost
    Exclusive,
}

impl CursorBoundary {
    /// Computes the cursor for the page following a record created at
    /// `timestamp`
    ///
    /// In exclusive mode an unparseable timestamp falls back to the raw value.
    pub fn next_cursor(&self, timestamp: &str) -> Cursor {
        match self {
            Self::Inclusive => Cursor::new(timestamp),
            Self::Exclusive => match step_back_one_milli(timestamp) {
                Some(shifted) => Cursor::new(shifted),
                None => {
                    tracing::warn!(
                        "Cannot parse timestamp '{}', using it verbatim as cursor",
                        timestamp
                    );
                    Cursor::new(timestamp)
                }
            },
        }
    }
}

/// Parses an upstream timestamp in any of the layouts it has been seen in
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(timestamp)
        .or_else(|_| DateTime::parse_from_str(timestamp, COMPACT_OFFSET_FORMAT))
        .or_else(|_| DateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Subtracts one millisecond, keeping the original offset, layout and
/// fractional precision
fn step_back_one_milli(timestamp: &str) -> Option<String> {
    let parsed = parse_timestamp(timestamp)?;
    let shifted = parsed - Duration::milliseconds(1);

    let digits = fraction_digits(timestamp);
    let fraction = match digits {
        0..=3 => "%.3f",
        4..=6 => "%.6f",
        _ => "%.9f",
    };
    let offset = if timestamp.ends_with('Z') {
        "Z"
    } else if timestamp.len() >= 3 && timestamp.as_bytes()[timestamp.len() - 3] == b':' {
        "%:z"
    } else {
        "%z"
    };

    let format = format!("%Y-%m-%dT%H:%M:%S{}{}", fraction, offset);
    Some(shifted.format(&format).to_string())
}

/// Number of digits after the seconds' decimal point
fn fraction_digits(timestamp: &str) -> usize {
    let time = timestamp.split_once('T').map_or(timestamp, |(_, time)| time);
    time.split_once('.')
        .map_or(0, |(_, rest)| rest.chars().take_while(char::is_ascii_digit).count())
}
