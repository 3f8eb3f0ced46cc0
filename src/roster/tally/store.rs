//! In-memory record table keyed by identity.
//!
//! Records keep their insertion order; an identity → position index makes
//! lookups and upserts constant time. Mutations are announced to subscribers
//! as [`StoreEvent`]s carrying only the affected batch.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use crate::roster::tally::model::{Record, RecordId, UpsertCounts};

/// Change notification emitted after a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Final state of every record inserted or replaced by one batch.
    Upserted(Vec<Record>),
    /// Identities removed by one batch.
    Removed(Vec<RecordId>),
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    index: HashMap<RecordId, usize>,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer; every later mutation is delivered on the
    /// returned channel.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Replaces the whole content without diffing or notifying.
    pub fn load(&mut self, records: Vec<Record>) {
        self.records.clear();
        self.index.clear();
        for record in records {
            self.put(record);
        }
        debug!(record_count = self.records.len(), "record store loaded");
    }

    /// Inserts unknown identities at the end and replaces known ones in place.
    ///
    /// An identity repeated within `records` is counted once, according to
    /// whether it existed before the batch, and its last entry wins.
    pub fn upsert_batch(&mut self, records: Vec<Record>) -> UpsertCounts {
        let mut counts = UpsertCounts::default();
        let mut affected: Vec<RecordId> = Vec::new();
        let mut seen: HashSet<RecordId> = HashSet::new();

        for record in records {
            if seen.insert(record.id.clone()) {
                if self.index.contains_key(&record.id) {
                    counts.updated += 1;
                } else {
                    counts.inserted += 1;
                }
                affected.push(record.id.clone());
            }
            self.put(record);
        }

        if !affected.is_empty() {
            let batch = affected
                .iter()
                .filter_map(|id| self.get(id).cloned())
                .collect();
            self.notify(StoreEvent::Upserted(batch));
        }
        counts
    }

    /// Removes the given identities; unknown ones are ignored. Returns the
    /// identities that were actually removed.
    pub fn remove_batch(&mut self, ids: &[RecordId]) -> Vec<RecordId> {
        let targets: HashSet<&RecordId> = ids
            .iter()
            .filter(|id| self.index.contains_key(*id))
            .collect();
        if targets.is_empty() {
            return Vec::new();
        }

        let mut removed = Vec::with_capacity(targets.len());
        self.records.retain(|record| {
            if targets.contains(&record.id) {
                removed.push(record.id.clone());
                false
            } else {
                true
            }
        });
        self.reindex();
        self.notify(StoreEvent::Removed(removed.clone()));
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    /// Current content in insertion order.
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.records.iter().map(|record| &record.id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn put(&mut self, record: Record) {
        match self.index.get(&record.id) {
            Some(&position) => self.records[position] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.id.clone(), position))
            .collect();
    }

    fn notify(&mut self, event: StoreEvent) {
        // Receivers that went away are dropped from the list.
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
