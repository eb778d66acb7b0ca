//! In-memory record store shared across screens.
//!
//! # Responsibility
//! - Keep the canonical ordered sequence of registered people.
//! - Provide add/update/delete/list mutations addressed by stable ID.
//! - Notify every subscribed observer before a mutation returns.
//!
//! # Invariants
//! - Insertion order is display order; mutations never reorder records.
//! - `id` values are unique for the lifetime of the store.
//! - The underlying sequence is only reachable through these operations,
//!   so observers never see a torn update.

use crate::model::person::{Person, PersonId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store mutation errors.
///
/// `NotFound` on update/delete indicates the in-memory and persisted views
/// diverged and is treated as a consistency bug by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicateId(PersonId),
    NotFound(PersonId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "person id already present: {id}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
        }
    }
}

impl Error for StoreError {}

/// Observer interface for screens rendering the record list or map.
///
/// Called synchronously inside each mutation, after the new state is
/// applied and before the mutating call returns.
pub trait StoreObserver: Send + Sync {
    fn on_records_changed(&self, records: &[Person]);
}

/// Ordered in-memory collection of registered people.
#[derive(Default)]
pub struct RecordStore {
    records: Vec<Person>,
    observers: Vec<Arc<dyn StoreObserver>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one observer for subsequent mutations.
    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    /// Read-only view of the current ordered sequence.
    pub fn list(&self) -> &[Person] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns one record by stable ID.
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.records.iter().find(|person| person.id == id)
    }

    /// Appends one record to the end of the sequence.
    pub fn add(&mut self, person: Person) -> StoreResult<PersonId> {
        if self.records.iter().any(|existing| existing.id == person.id) {
            return Err(StoreError::DuplicateId(person.id));
        }

        let id = person.id;
        self.records.push(person);
        self.notify();
        Ok(id)
    }

    /// Replaces the record matching `replacement.id` wholesale.
    pub fn update(&mut self, replacement: Person) -> StoreResult<()> {
        let slot = self
            .records
            .iter_mut()
            .find(|person| person.id == replacement.id)
            .ok_or(StoreError::NotFound(replacement.id))?;

        *slot = replacement;
        self.notify();
        Ok(())
    }

    /// Removes the record matching `id`.
    pub fn delete(&mut self, id: PersonId) -> StoreResult<()> {
        let position = self
            .records
            .iter()
            .position(|person| person.id == id)
            .ok_or(StoreError::NotFound(id))?;

        self.records.remove(position);
        self.notify();
        Ok(())
    }

    /// Replaces the whole sequence, used when hydrating from the mirror.
    ///
    /// Rejects input containing duplicate ids so a corrupt-but-decodable
    /// payload cannot break the uniqueness invariant.
    pub fn replace_all(&mut self, records: Vec<Person>) -> StoreResult<()> {
        for (index, person) in records.iter().enumerate() {
            if records[..index].iter().any(|other| other.id == person.id) {
                return Err(StoreError::DuplicateId(person.id));
            }
        }

        self.records = records;
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.on_records_changed(&self.records);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordStore, StoreError, StoreObserver};
    use crate::model::person::{GeoPoint, Person};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingObserver {
        notified: AtomicUsize,
    }

    impl StoreObserver for CountingObserver {
        fn on_records_changed(&self, _records: &[Person]) {
            self.notified.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample(name: &str) -> Person {
        Person::new(name, "Rua A, 1 - Santos, SP", GeoPoint::new(-23.9, -46.3))
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut store = RecordStore::new();
        let person = sample("Ana");
        store.add(person.clone()).unwrap();

        let err = store.add(person.clone()).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(person.id));
    }

    #[test]
    fn observers_run_once_per_mutation() {
        let observer = Arc::new(CountingObserver {
            notified: AtomicUsize::new(0),
        });
        let mut store = RecordStore::new();
        store.subscribe(observer.clone());

        let person = sample("Ana");
        store.add(person.clone()).unwrap();
        store.update(person.clone()).unwrap();
        store.delete(person.id).unwrap();

        assert_eq!(observer.notified.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn failed_mutations_do_not_notify() {
        let observer = Arc::new(CountingObserver {
            notified: AtomicUsize::new(0),
        });
        let mut store = RecordStore::new();
        store.subscribe(observer.clone());

        let person = sample("Ana");
        assert!(store.update(person.clone()).is_err());
        assert!(store.delete(person.id).is_err());
        assert_eq!(observer.notified.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn replace_all_rejects_duplicate_ids() {
        let mut store = RecordStore::new();
        let person = sample("Ana");
        let err = store
            .replace_all(vec![person.clone(), person.clone()])
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(person.id));
    }
}
