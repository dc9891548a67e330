//src/store.rs
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::api::{ApiError, ApiResponse};
use crate::models::WorkoutRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error accessing store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize store contents: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The authoritative in-memory collection of workout records for the current
/// session.
///
/// Ordering is insertion-stable with new records prepended, so the most
/// recently created entry comes first. When a persistence path is set (the
/// offline variant), `persist` rewrites the whole serialized array; callers
/// invoke it after every mutation they want durable.
#[derive(Debug, Default)]
pub struct Store {
    records: Vec<WorkoutRecord>,
    persist_path: Option<PathBuf>,
}

impl Store {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a store backed by a file, rehydrating any previously saved
    /// records.
    pub fn with_persistence(path: PathBuf) -> Result<Self, StoreError> {
        let records = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };
        Ok(Self {
            records,
            persist_path: Some(path),
        })
    }

    pub fn records(&self) -> &[WorkoutRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&WorkoutRecord> {
        self.records.iter().find(|w| w.id == id)
    }

    /// Replaces the entire contents, e.g. after fetching from the server.
    pub fn replace_all(&mut self, records: Vec<WorkoutRecord>) {
        self.records = records;
    }

    /// Inserts a newly created record at the front.
    pub fn prepend(&mut self, record: WorkoutRecord) {
        self.records.insert(0, record);
    }

    /// Applies `f` to the record with the given id, in place.
    /// Returns false when no such record exists.
    pub fn update<F: FnOnce(&mut WorkoutRecord)>(&mut self, id: i64, f: F) -> bool {
        match self.records.iter_mut().find(|w| w.id == id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    /// Swaps in a full record by id, keeping its position.
    pub fn replace(&mut self, record: WorkoutRecord) -> bool {
        match self.records.iter_mut().find(|w| w.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<WorkoutRecord> {
        let index = self.records.iter().position(|w| w.id == id)?;
        Some(self.records.remove(index))
    }

    /// A full copy of the current contents, for whole-store rollback.
    pub fn snapshot(&self) -> Vec<WorkoutRecord> {
        self.records.clone()
    }

    pub fn restore(&mut self, snapshot: Vec<WorkoutRecord>) {
        self.records = snapshot;
    }

    /// Rewrites the backing file, when one is configured.
    pub fn persist(&self) -> Result<(), StoreError> {
        if let Some(path) = &self.persist_path {
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, serde_json::to_string(&self.records)?)?;
        }
        Ok(())
    }
}

/// Runs a store mutation optimistically against a remote call.
///
/// The forward mutation is applied before the remote call is issued, so the
/// local state reflects the user's action immediately. When the call fails
/// (transport error or non-2xx status) the inverse mutation reverts the
/// store and the failure is returned to the caller; on success the store is
/// already correct and is left alone.
///
/// The inverse is whatever the caller captured up front: a single field's
/// prior value, or a whole-store snapshot. A snapshot inverse restores
/// everything as of the capture point, discarding any unrelated mutation
/// that completed while this call was in flight.
pub fn mutate_optimistic<F, I, R>(
    store: &mut Store,
    forward: F,
    inverse: I,
    remote: R,
) -> Result<ApiResponse, ApiError>
where
    F: FnOnce(&mut Store),
    I: FnOnce(&mut Store),
    R: FnOnce() -> Result<ApiResponse, ApiError>,
{
    forward(store);
    match remote() {
        Ok(response) if response.ok() => Ok(response),
        Ok(response) => {
            inverse(store);
            Err(ApiError::Rejected {
                status: response.status,
                message: response.error_message(),
            })
        }
        Err(err) => {
            inverse(store);
            Err(err)
        }
    }
}
