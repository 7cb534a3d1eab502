// Record store: in-memory snapshot backed by an atomically replaced JSONL file

use crate::error::{Error, Result};
use crate::filter::{Filter, matches_all};
use crate::jsonl::{self, StoreMeta};
use crate::record::{MaintenanceRecord, NewRecord, RecordPatch};
use chrono::Utc;
use fs2::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const STORE_DIR: &str = ".vinsight";
const DATA_FILE: &str = "maintenance.jsonl";
const LOCK_FILE: &str = ".lock";

/// Maintenance records for one store directory
///
/// The whole record set is loaded on `open` and every mutation rewrites the
/// data file before returning. The store holds an exclusive lock on the
/// directory until it is dropped.
pub struct Store {
    base_path: PathBuf,
    meta: StoreMeta,
    records: Vec<MaintenanceRecord>,
    _lock: File,
}

impl Store {
    /// Open or create a store at the given path
    ///
    /// The store lives in a `.vinsight` subdirectory of the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().join(STORE_DIR);

        fs::create_dir_all(&base_path).map_err(|e| Error::io(&base_path, e))?;

        let lock_path = base_path.join(LOCK_FILE);
        let lock = File::create(&lock_path).map_err(|e| Error::io(&lock_path, e))?;
        lock.lock_exclusive().map_err(|e| Error::io(&lock_path, e))?;

        create_gitignore(&base_path)?;
        write_version(&base_path)?;

        let snapshot = jsonl::read_snapshot(&base_path.join(DATA_FILE))?;

        debug!(
            path = ?base_path,
            count = snapshot.records.len(),
            next_id = snapshot.meta.next_id,
            "Opened store"
        );

        Ok(Self {
            base_path,
            meta: snapshot.meta,
            records: snapshot.records,
            _lock: lock,
        })
    }

    /// Directory holding the store files
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the JSONL data file
    pub fn data_path(&self) -> PathBuf {
        self.base_path.join(DATA_FILE)
    }

    /// All records in storage order
    pub fn records(&self) -> &[MaintenanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ========================================================================
    // CRUD API
    // ========================================================================

    /// Validate and store a new record, returning it with its assigned id
    pub fn add(&mut self, new: NewRecord) -> Result<MaintenanceRecord> {
        let id = self.next_id()?;
        let next_id = id.checked_add(1).ok_or_else(id_space_exhausted)?;
        let record = new.into_record(id, Utc::now())?;

        let mut records = self.records.clone();
        records.push(record.clone());
        let meta = StoreMeta {
            version: jsonl::FORMAT_VERSION,
            next_id,
        };
        self.commit(meta, records)?;

        info!(id, car = %record.car, "Added record");
        Ok(record)
    }

    /// Records sorted by date (then id), optionally limited to one car
    ///
    /// The car name must match exactly, ignoring case.
    pub fn list(&self, car: Option<&str>) -> Vec<MaintenanceRecord> {
        let car = car.map(|c| c.trim().to_lowercase());
        let mut results: Vec<MaintenanceRecord> = self
            .records
            .iter()
            .filter(|r| car.as_ref().is_none_or(|c| r.car.to_lowercase() == *c))
            .cloned()
            .collect();

        results.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        results
    }

    /// Get a record by id
    pub fn get(&self, id: u64) -> Option<MaintenanceRecord> {
        self.records.iter().find(|r| r.id == id).cloned()
    }

    /// Apply a partial update to a record
    ///
    /// An unknown id is `Error::NotFound`, checked before an empty patch
    /// (`Error::NoChanges`).
    pub fn update(&mut self, id: u64, patch: &RecordPatch) -> Result<MaintenanceRecord> {
        let pos = self.position(id)?;
        if patch.is_empty() {
            return Err(Error::NoChanges);
        }

        let mut records = self.records.clone();
        records[pos].apply(patch, Utc::now())?;
        let updated = records[pos].clone();

        self.commit(self.meta, records)?;

        info!(id, "Updated record");
        Ok(updated)
    }

    /// Delete a record, returning what was removed
    pub fn delete(&mut self, id: u64) -> Result<MaintenanceRecord> {
        let pos = self.position(id)?;
        let mut records = self.records.clone();
        let removed = records.remove(pos);

        // Keep the high-water mark so the id is never handed out again
        let meta = StoreMeta {
            version: jsonl::FORMAT_VERSION,
            next_id: self.next_id().unwrap_or(u64::MAX),
        };
        self.commit(meta, records)?;

        info!(id, "Deleted record");
        Ok(removed)
    }

    /// Records matching every filter, in storage order
    pub fn search(&self, filters: &[Filter]) -> Vec<MaintenanceRecord> {
        let results: Vec<MaintenanceRecord> = self
            .records
            .iter()
            .filter(|r| matches_all(filters, r))
            .cloned()
            .collect();

        debug!(filters = filters.len(), matched = results.len(), "Searched records");
        results
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Next id: past both the stored high-water mark and every existing id
    fn next_id(&self) -> Result<u64> {
        let after_max = match self.records.iter().map(|r| r.id).max() {
            Some(max) => max.checked_add(1).ok_or_else(id_space_exhausted)?,
            None => 1,
        };
        Ok(self.meta.next_id.max(after_max).max(1))
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// Write the new state to disk, then adopt it in memory
    fn commit(&mut self, meta: StoreMeta, records: Vec<MaintenanceRecord>) -> Result<()> {
        jsonl::write_snapshot(&self.data_path(), &meta, &records)?;
        self.meta = meta;
        self.records = records;
        Ok(())
    }
}

fn id_space_exhausted() -> Error {
    Error::Validation("record id space exhausted".to_string())
}

fn create_gitignore(base_path: &Path) -> Result<()> {
    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, ".lock\n.tmp*\n").map_err(|e| Error::io(&gitignore_path, e))?;
    }
    Ok(())
}

fn write_version(base_path: &Path) -> Result<()> {
    let version_path = base_path.join(".version");
    if !version_path.exists() {
        fs::write(&version_path, jsonl::FORMAT_VERSION.to_string()).map_err(|e| Error::io(&version_path, e))?;
    }
    Ok(())
}
