//! Record data model
//!
//! This module defines what the crawler accumulates:
//! - [`Record`]: one fetched item with its identifier, timestamp and raw payload
//! - [`Cursor`] and [`CursorBoundary`]: the pagination token and how it advances
//! - [`TopicContent`] and [`TopicSummary`]: typed views over the payload
//! - [`AccumulatedSet`]: the ordered, deduplicated working set

mod content;
mod cursor;
mod markup;

pub use content::{ContentKind, TopicContent, TopicSummary};
pub use cursor::{parse_timestamp, Cursor, CursorBoundary};
pub use markup::clean_text;

use crate::config::ResponseConfig;
use serde_json::Value;
use std::collections::HashSet;

/// Names of the item fields carrying identity and ordering
///
/// A name starting with `/` is treated as a JSON pointer into the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    pub id_field: String,
    pub time_field: String,
}

impl FieldMap {
    pub fn new(id_field: impl Into<String>, time_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            time_field: time_field.into(),
        }
    }

    /// Creation timestamp of a raw item, if present and non-empty
    pub fn timestamp_of<'a>(&self, item: &'a Value) -> Option<&'a str> {
        lookup(item, &self.time_field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl From<&ResponseConfig> for FieldMap {
    fn from(config: &ResponseConfig) -> Self {
        Self::new(config.id_field.clone(), config.time_field.clone())
    }
}

/// One fetched content item
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Unique identifier; numeric upstream ids are stringified
    pub id: String,

    /// Creation timestamp as sent by the upstream
    pub created_at: String,

    /// The item exactly as returned
    pub payload: Value,
}

impl Record {
    /// Builds a record from a raw item, or `None` if the id or timestamp is
    /// missing or empty
    pub fn from_item(item: Value, fields: &FieldMap) -> Option<Self> {
        let id = lookup(&item, &fields.id_field).and_then(scalar_to_string)?;
        let created_at = fields.timestamp_of(&item)?.to_string();

        Some(Self {
            id,
            created_at,
            payload: item,
        })
    }

    pub fn summary(&self) -> TopicSummary {
        TopicSummary::from_record(self)
    }

    pub fn content(&self) -> TopicContent {
        TopicContent::from_payload(&self.payload)
    }
}

/// Reads a field by name, or by JSON pointer when the name starts with `/`
fn lookup<'a>(item: &'a Value, field: &str) -> Option<&'a Value> {
    if field.starts_with('/') {
        item.pointer(field)
    } else {
        item.get(field)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Ordered sequence of records plus the set of identifiers already seen
///
/// Insertion order is preserved; an identifier is stored at most once.
#[derive(Debug, Clone, Default)]
pub struct AccumulatedSet {
    records: Vec<Record>,
    seen: HashSet<String>,
}

impl AccumulatedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from previously persisted records, dropping repeats
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut set = Self::new();
        for record in records {
            set.insert(record);
        }
        set
    }

    /// Appends the record if its identifier is unseen
    ///
    /// Returns `false` (and drops the record) for a duplicate.
    pub fn insert(&mut self, record: Record) -> bool {
        if self.seen.contains(&record.id) {
            return false;
        }
        self.seen.insert(record.id.clone());
        self.records.push(record);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The most recently appended record, i.e. the oldest one fetched
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Raw payloads, in order, for the raw checkpoint mirror
    pub fn raw_items(&self) -> Vec<Value> {
        self.records.iter().map(|r| r.payload.clone()).collect()
    }

    /// Summaries, in order, for the processed checkpoint
    pub fn summaries(&self) -> Vec<TopicSummary> {
        self.records.iter().map(Record::summary).collect()
    }
}
