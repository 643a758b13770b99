//! In-memory record store
//!
//! Each [`RecordStore`] owns its records and id sequence behind one
//! `RwLock`: id issuance and the push happen under the same write guard, so
//! concurrent appends never share an id and readers never see a half-applied
//! batch. Contents are lost on restart.

use crate::ids::IdSequence;
use crate::models::{Plan, Project};
use crate::{Error, Result};
use tokio::sync::RwLock;
use tracing::debug;

/// A record with a store-assigned integer id
pub trait Record: Clone + Send + Sync {
    /// Human-readable kind used in not-found messages
    const KIND: &'static str;

    fn id(&self) -> u64;
}

impl Record for Project {
    const KIND: &'static str = "Project";

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Plan {
    const KIND: &'static str = "Plan";

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
struct Inner<T> {
    ids: IdSequence,
    /// Ascending by id
    records: Vec<T>,
}

/// Append-only collection of one record type
#[derive(Debug)]
pub struct RecordStore<T> {
    inner: RwLock<Inner<T>>,
}

impl<T: Record> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordStore<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                ids: IdSequence::new(),
                records: Vec::new(),
            }),
        }
    }

    /// Assign the next id, build the record with it and store it
    pub async fn append<F>(&self, build: F) -> T
    where
        F: FnOnce(u64) -> T,
    {
        let mut inner = self.inner.write().await;
        let record = build(inner.ids.issue());
        inner.records.push(record.clone());
        debug!(kind = T::KIND, id = record.id(), "Record appended");
        record
    }

    /// Append one record per item as a single atomic step
    pub async fn append_batch<I, F>(&self, items: Vec<I>, mut build: F) -> Vec<T>
    where
        F: FnMut(u64, I) -> T,
    {
        let mut inner = self.inner.write().await;
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let record = build(inner.ids.issue(), item);
            created.push(record);
        }
        inner.records.extend(created.iter().cloned());
        debug!(kind = T::KIND, count = created.len(), "Record batch appended");
        created
    }

    /// All records in insertion order
    pub async fn list(&self) -> Vec<T> {
        self.inner.read().await.records.clone()
    }

    /// Records matching `predicate`, in insertion order
    pub async fn list_where<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.inner
            .read()
            .await
            .records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: u64) -> Result<T> {
        let inner = self.inner.read().await;
        inner
            .records
            .binary_search_by_key(&id, |record| record.id())
            .map(|index| inner.records[index].clone())
            .map_err(|_| Error::NotFound(format!("{} {} does not exist", T::KIND, id)))
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.get(id).await.is_ok()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Every record the process holds
#[derive(Debug, Default)]
pub struct Store {
    pub projects: RecordStore<Project>,
    pub plans: RecordStore<Plan>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans belonging to one project, or all plans when `project_id` is `None`
    pub async fn plans_for(&self, project_id: Option<u64>) -> Vec<Plan> {
        match project_id {
            Some(id) => self.plans.list_where(|plan| plan.project_id == id).await,
            None => self.plans.list().await,
        }
    }
}
