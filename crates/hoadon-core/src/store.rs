//! Persistence of finalized invoices.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::invoice::{InvoiceRecord, InvoiceStatus};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Where finalized invoices go.
pub trait InvoiceStore {
    /// Persist a new record. The store assigns `id` (max existing + 1,
    /// starting at 1) and returns the stored record.
    fn insert(&mut self, record: InvoiceRecord) -> StoreResult<InvoiceRecord>;

    /// All records in insertion order.
    fn list(&self) -> StoreResult<Vec<InvoiceRecord>>;

    /// Replace the stored record with the same id.
    fn update(&mut self, record: &InvoiceRecord) -> StoreResult<()>;

    /// Look up one record.
    fn get(&self, id: u64) -> StoreResult<InvoiceRecord> {
        self.list()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Administrative soft delete. Never reverses.
    fn mark_deleted(&mut self, id: u64) -> StoreResult<InvoiceRecord> {
        let mut record = self.get(id)?;
        if record.status == InvoiceStatus::Deleted {
            return Err(StoreError::AlreadyDeleted(id));
        }
        record.status = InvoiceStatus::Deleted;
        self.update(&record)?;
        info!("Marked invoice {} as deleted", id);
        Ok(record)
    }
}

fn next_id(records: &[InvoiceRecord]) -> u64 {
    records.iter().map(|r| r.id).max().unwrap_or(0) + 1
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<InvoiceRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl InvoiceStore for MemoryStore {
    fn insert(&mut self, mut record: InvoiceRecord) -> StoreResult<InvoiceRecord> {
        record.id = next_id(&self.records);
        self.records.push(record.clone());
        Ok(record)
    }

    fn list(&self) -> StoreResult<Vec<InvoiceRecord>> {
        Ok(self.records.clone())
    }

    fn update(&mut self, record: &InvoiceRecord) -> StoreResult<()> {
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(StoreError::NotFound(record.id))?;
        *slot = record.clone();
        Ok(())
    }
}

/// JSON-lines file store: one record per line.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// The file is created on first insert.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<Vec<InvoiceRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| StoreError::Corrupt {
                    line: i + 1,
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    fn ensure_parent(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl InvoiceStore for JsonlStore {
    fn insert(&mut self, mut record: InvoiceRecord) -> StoreResult<InvoiceRecord> {
        let records = self.load()?;
        record.id = next_id(&records);

        let line = serde_json::to_string(&record)?;
        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        debug!("Appended invoice {} to {}", record.id, self.path.display());
        Ok(record)
    }

    fn list(&self) -> StoreResult<Vec<InvoiceRecord>> {
        self.load()
    }

    fn update(&mut self, record: &InvoiceRecord) -> StoreResult<()> {
        let mut records = self.load()?;
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(StoreError::NotFound(record.id))?;
        *slot = record.clone();

        let mut content = String::new();
        for r in &records {
            content.push_str(&serde_json::to_string(r)?);
            content.push('\n');
        }

        // Write beside the target, then swap in.
        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
