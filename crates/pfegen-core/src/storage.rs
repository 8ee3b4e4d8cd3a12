//! Durable key-value storage and the typed "last report" slot on top of it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PfeError, Result};
use crate::report::LastReport;

/// Key under which the last successful report is stored.
pub const LAST_REPORT_KEY: &str = "lastReport";

/// A string-keyed store of JSON values. Last writer wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// When `key` was last written, if the store tracks it.
    fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let _ = key;
        Ok(None)
    }
}

/// Single typed slot holding the last successful submission.
pub trait LastReportStore {
    fn load(&self) -> Result<Option<LastReport>>;
    /// Overwrite the slot. Fails without writing if the result is unsuccessful.
    fn save(&self, report: &LastReport) -> Result<()>;
    fn saved_at(&self) -> Result<Option<DateTime<Utc>>>;
}

impl<S: KeyValueStore + ?Sized> LastReportStore for S {
    fn load(&self) -> Result<Option<LastReport>> {
        let Some(value) = self.get(LAST_REPORT_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_value::<LastReport>(value) {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable {} slot", LAST_REPORT_KEY);
                Ok(None)
            }
        }
    }

    fn save(&self, report: &LastReport) -> Result<()> {
        if !report.result.success {
            return Err(PfeError::UnsuccessfulReport);
        }
        self.set(LAST_REPORT_KEY, serde_json::to_value(report)?)
    }

    fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.updated_at(LAST_REPORT_KEY)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: Value,
    updated_at: DateTime<Utc>,
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| PfeError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(key).map(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.lock()?.insert(
            key.to_string(),
            Entry {
                value,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock()?.get(key).map(|e| e.updated_at))
    }
}

/// JSON file holding every entry. Re-read on each access so that several
/// running instances see each other's writes.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.local/share/pfegen/storage.json` (platform equivalent).
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| PfeError::Storage("Could not determine data directory".into()))?;
        Ok(data_dir.join("pfegen").join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Entry>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            PfeError::Storage(format!("Failed to parse {}: {e}", self.path.display()))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, Entry>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        // Replace atomically via a sibling temp file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "Storage written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all()?.remove(key).map(|e| e.value))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        // An unreadable file is replaced wholesale.
        let mut entries = self.read_all().unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable storage file");
            BTreeMap::new()
        });
        entries.insert(
            key.to_string(),
            Entry {
                value,
                updated_at: Utc::now(),
            },
        );
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read_all()?.get(key).map(|e| e.updated_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportRequest, ReportResult};

    fn report(subject: &str, success: bool) -> LastReport {
        LastReport {
            data: ReportRequest {
                subject: subject.to_string(),
                framework: "STAR".to_string(),
                ..Default::default()
            },
            result: ReportResult {
                success,
                pdf_url: Some("/static/rapports/r.pdf".to_string()),
                ..Default::default()
            },
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pfegen-test-{}-{}", std::process::id(), name))
            .join("storage.json")
    }

    #[test]
    fn empty_store_has_no_report() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        assert!(store.saved_at().unwrap().is_none());
    }

    #[test]
    fn save_then_load_returns_same_report() {
        let store = MemoryStore::new();
        let saved = report("A", true);
        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), Some(saved));
        assert!(store.saved_at().unwrap().is_some());
    }

    #[test]
    fn later_save_overwrites() {
        let store = MemoryStore::new();
        store.save(&report("A", true)).unwrap();
        store.save(&report("B", true)).unwrap();
        assert_eq!(store.load().unwrap().unwrap().data.subject, "B");
    }

    #[test]
    fn unsuccessful_report_is_refused() {
        let store = MemoryStore::new();
        store.save(&report("A", true)).unwrap();
        let err = store.save(&report("B", false)).unwrap_err();
        assert!(matches!(err, PfeError::UnsuccessfulReport));
        assert_eq!(store.load().unwrap().unwrap().data.subject, "A");
    }

    #[test]
    fn corrupt_slot_reads_as_absent() {
        let store = MemoryStore::new();
        store
            .set(LAST_REPORT_KEY, serde_json::json!({"data": 3}))
            .unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        FileStore::new(&path).save(&report("Persisted", true)).unwrap();

        let reopened = FileStore::new(&path);
        let loaded = reopened.load().unwrap().unwrap();
        assert_eq!(loaded.data.subject, "Persisted");
        assert!(reopened.saved_at().unwrap().is_some());

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get(LAST_REPORT_KEY).is_some());

        reopened.remove(LAST_REPORT_KEY).unwrap();
        assert!(reopened.load().unwrap().is_none());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_store_replaces_unreadable_file_on_write() {
        let path = temp_path("garbage");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(store.get(LAST_REPORT_KEY).is_err());
        store.save(&report("Fresh", true)).unwrap();
        assert_eq!(store.load().unwrap().unwrap().data.subject, "Fresh");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
