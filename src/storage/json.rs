//! JSON file checkpoint store
//!
//! Two pretty-printed UTF-8 arrays: the processed summaries and the raw
//! items. Each file is written to a sibling `.tmp` file and renamed over the
//! target, so an interrupted write leaves the previous checkpoint intact.

use crate::record::{AccumulatedSet, FieldMap, Record, TopicSummary};
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Checkpoint store backed by two JSON files
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    processed_path: PathBuf,
    raw_path: PathBuf,
    fields: FieldMap,
}

impl JsonFileStore {
    /// Creates a store; nothing is touched on disk until the first save
    ///
    /// `fields` names the id and timestamp fields used to rebuild records
    /// from the raw file on load.
    pub fn new(
        processed_path: impl Into<PathBuf>,
        raw_path: impl Into<PathBuf>,
        fields: FieldMap,
    ) -> Self {
        Self {
            processed_path: processed_path.into(),
            raw_path: raw_path.into(),
            fields,
        }
    }

    pub fn processed_path(&self) -> &Path {
        &self.processed_path
    }

    pub fn raw_path(&self) -> &Path {
        &self.raw_path
    }

    /// Reads the processed summaries, or `None` if the file does not exist
    pub fn load_summaries(&self) -> StorageResult<Option<Vec<TopicSummary>>> {
        read_json(&self.processed_path)
    }

    /// Reads the raw items, or `None` if the file does not exist
    pub fn load_raw(&self) -> StorageResult<Option<Vec<Value>>> {
        read_json(&self.raw_path)
    }
}

impl CheckpointStore for JsonFileStore {
    fn load(&self) -> StorageResult<Option<AccumulatedSet>> {
        let Some(items) = self.load_raw()? else {
            if self.processed_path.exists() {
                tracing::warn!(
                    "{} exists but {} does not; summaries alone cannot seed a resume",
                    self.processed_path.display(),
                    self.raw_path.display()
                );
            }
            return Ok(None);
        };

        let total = items.len();
        let records: Vec<Record> = items
            .into_iter()
            .filter_map(|item| Record::from_item(item, &self.fields))
            .collect();

        if records.len() < total {
            tracing::warn!(
                "Ignored {} persisted items without '{}' or '{}'",
                total - records.len(),
                self.fields.id_field,
                self.fields.time_field
            );
        }

        let set = AccumulatedSet::from_records(records);
        tracing::debug!(
            "Loaded {} records from {}",
            set.len(),
            self.raw_path.display()
        );
        Ok(Some(set))
    }

    fn save(&mut self, processed: &[TopicSummary], raw: &[Value]) -> StorageResult<()> {
        write_json_atomic(&self.processed_path, processed)?;
        write_json_atomic(&self.raw_path, raw)?;
        tracing::debug!(
            "Checkpoint written: {} records to {} and {}",
            raw.len(),
            self.processed_path.display(),
            self.raw_path.display()
        );
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let body = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, body).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(
            dir.path().join("topics.json"),
            dir.path().join("topics_raw.json"),
            FieldMap::new("topic_id", "create_time"),
        )
    }

    fn item(id: u64, time: &str) -> Value {
        json!({
            "topic_id": id,
            "create_time": time,
            "talk": {"owner": {"name": "alice"}, "text": format!("post {}", id)}
        })
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).load().unwrap().is_none());
        assert!(store(&dir).load_summaries().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);

        let set = AccumulatedSet::from_records(vec![
            Record::from_item(item(2, "2024-01-02T00:00:00.000+0800"), &store.fields).unwrap(),
            Record::from_item(item(1, "2024-01-01T00:00:00.000+0800"), &store.fields).unwrap(),
        ]);
        store.save_set(&set).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.last().unwrap().id, "1");

        let summaries = store.load_summaries().unwrap().unwrap();
        assert_eq!(summaries[0].text, "post 2");

        let tmp = dir.path().join("topics_raw.json.tmp");
        assert!(!tmp.exists());
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);

        store
            .save(&[], &[item(1, "2024-01-01T00:00:00.000+0800"), item(2, "2024-01-01T00:00:00.000+0800")])
            .unwrap();
        store.save(&[], &[item(3, "2024-01-01T00:00:00.000+0800")]).unwrap();

        let raw = store.load_raw().unwrap().unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0]["topic_id"], 3);
    }

    #[test]
    fn test_load_skips_items_without_identity() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        store
            .save(&[], &[item(1, "2024-01-01T00:00:00.000+0800"), json!({"talk": {}})])
            .unwrap();

        assert_eq!(store.load().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.raw_path(), "not json").unwrap();

        assert!(matches!(store.load(), Err(StorageError::Json { .. })));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(
            dir.path().join("out/topics.json"),
            dir.path().join("out/raw/topics_raw.json"),
            FieldMap::new("topic_id", "create_time"),
        );
        store.save(&[], &[]).unwrap();
        assert!(store.raw_path().exists());
    }
}
