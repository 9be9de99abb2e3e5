//! In-memory table shared by the memory repositories

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use bd_core::traits::Id;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repository::{Record, RepositoryError, RepositoryResult};

/// Rows keyed by id, iterated in id order
pub struct MemoryTable<T: Record> {
    rows: RwLock<BTreeMap<Id, T>>,
    next_id: AtomicI64,
}

impl<T: Record> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> MemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub async fn get(&self, id: Id) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    pub async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    pub async fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    pub async fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .find(|row| predicate(row))
            .cloned()
    }

    pub async fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .filter(|row| predicate(row))
            .count()
    }

    /// Insert (no id yet) or replace (existing id)
    ///
    /// `conflicts` sees every other stored row and returns a message when the
    /// new row would break a uniqueness rule.
    pub async fn save<F>(&self, mut row: T, conflicts: F) -> RepositoryResult<T>
    where
        F: Fn(&T, &T) -> Option<String>,
    {
        let mut rows = self.rows.write().await;

        if let Some(id) = row.record_id() {
            if !rows.contains_key(&id) {
                return Err(RepositoryError::NotFound(id.to_string()));
            }
        }

        let own_id = row.record_id();
        for other in rows.values().filter(|other| other.record_id() != own_id) {
            if let Some(message) = conflicts(&row, other) {
                return Err(RepositoryError::Conflict(message));
            }
        }

        let id = match own_id {
            Some(id) => id,
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                row.assign_id(id);
                id
            }
        };
        row.touch(Utc::now());
        rows.insert(id, row.clone());
        Ok(row)
    }

    pub async fn remove(&self, id: Id) -> RepositoryResult<()> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

/// No uniqueness rules
pub fn no_conflicts<T>(_new: &T, _existing: &T) -> Option<String> {
    None
}
