//! Storage collaborator for application records.

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    error::Error,
    issuance::{ApplicationId, ApplicationRecord, Status, Transition},
};

/// Key-value storage of [ApplicationRecord]s with atomic conditional updates.
///
/// Implementations must make [ApplicationStore::compare_and_update] and
/// [ApplicationStore::compare_and_remove] atomic with respect to each other for a given record:
/// the status check, the computation of the transition and its application happen as one step,
/// and concurrent callers for the same record are serialised.
pub trait ApplicationStore {
    /// Insert a new record. Fails with [Error::InvalidInput] if the id is already present.
    fn insert(&self, record: ApplicationRecord) -> Result<(), Error>;

    fn get(&self, id: &ApplicationId) -> Option<ApplicationRecord>;

    fn list(&self) -> Vec<ApplicationRecord>;

    /// If the record's status equals `expected`, compute a transition with `f` and apply it,
    /// returning the updated record. If `f` fails, nothing is written.
    ///
    /// Fails with [Error::UnknownApplication] if there is no such record, and with
    /// [Error::AlreadyDecided] if its status differs from `expected`.
    fn compare_and_update<F>(
        &self,
        id: &ApplicationId,
        expected: Status,
        f: F,
    ) -> Result<ApplicationRecord, Error>
    where
        F: FnOnce(&ApplicationRecord) -> Result<Transition, Error>;

    /// Remove the record if its status equals `expected`, with the same failure modes as
    /// [ApplicationStore::compare_and_update].
    fn compare_and_remove(
        &self,
        id: &ApplicationId,
        expected: Status,
    ) -> Result<ApplicationRecord, Error>;
}

type Slot = Arc<Mutex<Option<ApplicationRecord>>>;

/// In-memory [ApplicationStore] with a lock per record.
///
/// The map lock is only held to look up, add or drop a slot. Conditional updates hold the
/// record's own lock, so a slow transition on one record does not block access to the others.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<ApplicationId, Slot>>,
}

// Records are only written after a transition has been fully computed, so a panic while holding
// a lock never leaves a partially updated record behind.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: &ApplicationId) -> Option<Slot> {
        lock(&self.records).get(id).cloned()
    }
}

impl ApplicationStore for MemoryStore {
    fn insert(&self, record: ApplicationRecord) -> Result<(), Error> {
        let mut records = lock(&self.records);
        match records.entry(record.id()) {
            Entry::Occupied(mut slot) => {
                // A slot emptied by a concurrent removal may still be in the map.
                if lock(slot.get()).is_some() {
                    return Err(Error::InvalidInput("duplicate application id"));
                }
                slot.insert(Arc::new(Mutex::new(Some(record))));
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(Some(record))));
            }
        }
        Ok(())
    }

    fn get(&self, id: &ApplicationId) -> Option<ApplicationRecord> {
        let slot = self.slot(id)?;
        let record = lock(&slot).clone();
        record
    }

    fn list(&self) -> Vec<ApplicationRecord> {
        let slots: Vec<Slot> = lock(&self.records).values().cloned().collect();
        slots.iter().filter_map(|slot| lock(slot).clone()).collect()
    }

    fn compare_and_update<F>(
        &self,
        id: &ApplicationId,
        expected: Status,
        f: F,
    ) -> Result<ApplicationRecord, Error>
    where
        F: FnOnce(&ApplicationRecord) -> Result<Transition, Error>,
    {
        let slot = self.slot(id).ok_or(Error::UnknownApplication)?;
        let mut guard = lock(&slot);
        let record = guard.as_mut().ok_or(Error::UnknownApplication)?;
        if record.status() != expected {
            return Err(Error::AlreadyDecided);
        }
        let transition = f(record)?;
        record.apply(transition);
        Ok(record.clone())
    }

    fn compare_and_remove(
        &self,
        id: &ApplicationId,
        expected: Status,
    ) -> Result<ApplicationRecord, Error> {
        let slot = self.slot(id).ok_or(Error::UnknownApplication)?;
        let removed = {
            let mut guard = lock(&slot);
            let status = guard
                .as_ref()
                .map(ApplicationRecord::status)
                .ok_or(Error::UnknownApplication)?;
            if status != expected {
                return Err(Error::AlreadyDecided);
            }
            guard.take()
        };

        let mut records = lock(&self.records);
        if records
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, &slot))
        {
            records.remove(id);
        }
        removed.ok_or(Error::UnknownApplication)
    }
}
