//! JSONL page store.
//!
//! Each synced page is serialized as a single JSON line with a `stored_at`
//! timestamp, appended via a buffered writer. Downstream consumers
//! (embedding pipelines, exporters) read the file line by line.

use async_trait::async_trait;
use harvest_application::ports::page_store::{PageStorePort, StoreError};
use harvest_domain::Page;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Page store that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every page —
/// JSONL is append-only, so a crash loses at most the in-flight line.
pub struct JsonlPageStore {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlPageStore {
    /// Create a store writing to the given path, creating parent
    /// directories as needed. Truncates any previous run's output.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Write(format!("could not create {}: {}", parent.display(), e))
            })?;
        }

        let file = File::create(path)
            .map_err(|e| StoreError::Write(format!("could not create {}: {}", path.display(), e)))?;

        debug!("JSONL page store at {}", path.display());
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PageStorePort for JsonlPageStore {
    async fn save_page(&self, page: &Page) -> Result<(), StoreError> {
        let mut record = serde_json::to_value(page).map_err(|e| {
            StoreError::Serialize(format!("page {} did not serialize: {}", page.url, e))
        })?;

        if let serde_json::Value::Object(ref mut map) = record {
            let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
            map.insert(
                "stored_at".to_string(),
                serde_json::Value::String(timestamp),
            );
        }

        let line = serde_json::to_string(&record)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        writeln!(writer, "{}", line).map_err(|e| StoreError::Write(e.to_string()))?;
        writer.flush().map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }
}

impl Drop for JsonlPageStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_domain::{PageKind, PageMetadata};
    use std::io::Read;

    fn sample_page(title: &str) -> Page {
        let meta = PageMetadata::new("acme/widgets", PageKind::File, "2025-01-01T00:00:00Z");
        Page::new(
            "https://github.com/acme/widgets/blob/main/README.md",
            title,
            "# Widgets\n\nHello.",
            meta,
        )
    }

    #[tokio::test]
    async fn writes_valid_jsonl_with_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.jsonl");
        let store = JsonlPageStore::new(&path).unwrap();

        store.save_page(&sample_page("README one")).await.unwrap();
        store.save_page(&sample_page("README two")).await.unwrap();
        drop(store);

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("stored_at").is_some());
            assert_eq!(value["metadata"]["repo"], "acme/widgets");
        }

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["title"], "README one");
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("pages.jsonl");

        let store = JsonlPageStore::new(&path).unwrap();
        store.save_page(&sample_page("nested")).await.unwrap();
        assert!(path.exists());
    }
}
