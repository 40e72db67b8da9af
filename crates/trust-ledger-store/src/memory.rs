//! In-memory implementation of the EventStore trait.
//!
//! Primarily for tests and for hosts that keep their own persistence. All
//! data is lost when the store is dropped.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::{EventStore, InsertResult, StoredEvent};

/// In-memory event store. Thread-safe via RwLock.
pub struct MemoryEventStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Events indexed by id, with their insertion sequence.
    events: HashMap<String, (u64, StoredEvent)>,

    /// Session id -> event ids, in insertion order.
    sessions: HashMap<String, Vec<String>>,

    next_seq: u64,
}

impl MemoryEventStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Number of stored events.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.events.len())
    }

    /// Whether the store holds no events.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert_event(&self, event: &StoredEvent) -> Result<InsertResult> {
        let mut inner = self.write()?;

        if let Some((_, existing)) = inner.events.get(&event.event_id) {
            if existing == event {
                return Ok(InsertResult::AlreadyExists);
            }
            tracing::warn!(event_id = %event.event_id, "conflicting receipt for known event");
            return Ok(InsertResult::Conflict {
                existing_entry_hash: existing.record.entry_hash.clone(),
            });
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .sessions
            .entry(event.session_id.clone())
            .or_default()
            .push(event.event_id.clone());
        inner.events.insert(event.event_id.clone(), (seq, event.clone()));

        Ok(InsertResult::Inserted)
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<StoredEvent>> {
        let inner = self.read()?;
        Ok(inner.events.get(event_id).map(|(_, event)| event.clone()))
    }

    async fn has_event(&self, event_id: &str) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner.events.contains_key(event_id))
    }

    async fn get_session_events(&self, session_id: &str) -> Result<Vec<StoredEvent>> {
        let inner = self.read()?;
        let Some(ids) = inner.sessions.get(session_id) else {
            return Ok(Vec::new());
        };

        let mut events: Vec<&(u64, StoredEvent)> =
            ids.iter().filter_map(|id| inner.events.get(id)).collect();
        events.sort_by_key(|(seq, event)| (event.created_at, *seq));

        Ok(events.into_iter().map(|(_, event)| event.clone()).collect())
    }

    async fn list_sessions(&self) -> Result<Vec<String>> {
        let inner = self.read()?;
        let mut sessions: Vec<String> = inner.sessions.keys().cloned().collect();
        sessions.sort();
        Ok(sessions)
    }
}
