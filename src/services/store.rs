//! Document store boundary.
//!
//! ARCHITECTURE
//! ============
//! Pages persist submissions through [`DocumentStore`], keyed by collection
//! name and document id, mirroring the hosted document database the portal
//! talks to. [`MemoryStore`] is the in-process implementation used by the
//! headless shell and tests.
//!
//! Subscriptions deliver a full snapshot of the collection on every change,
//! starting with the snapshot at subscribe time.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, warn};
use uuid::Uuid;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 32;

/// Collections the portal reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Applications,
    Workshops,
    WorkshopRegistrations,
    ClubApplications,
    JobApplications,
    InternApplications,
}

impl Collection {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Applications => "applications",
            Self::Workshops => "workshops",
            Self::WorkshopRegistrations => "workshopRegistrations",
            Self::ClubApplications => "clubApplications",
            Self::JobApplications => "jobApplications",
            Self::InternApplications => "internApplications",
        }
    }
}

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: &'static str, id: String },
    #[error("documents must be JSON objects")]
    NotAnObject,
    #[error("document store unavailable")]
    Unavailable,
    #[error("invalid document: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Live view of a collection. Drop to unsubscribe.
pub struct SnapshotStream {
    initial: Option<Vec<Document>>,
    rx: broadcast::Receiver<Vec<Document>>,
}

impl SnapshotStream {
    /// Next full snapshot, or `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.rx.recv().await {
                Ok(docs) => return Some(docs),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "snapshot subscriber lagged; skipping to newest");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Async document-store operations. Enables swapping the backend in tests.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `data` under a fresh id and return the id.
    async fn create(&self, collection: Collection, data: Value) -> Result<String, StoreError>;

    /// Shallow-merge `patch` into an existing document.
    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), StoreError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    async fn subscribe(&self, collection: Collection) -> Result<SnapshotStream, StoreError>;
}

/// In-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Value>>>,
    watchers: Mutex<HashMap<Collection, broadcast::Sender<Vec<Document>>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with [`StoreError::Unavailable`] while set.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    fn sender(&self, collection: Collection) -> broadcast::Sender<Vec<Document>> {
        let mut watchers = self.inner.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        watchers
            .entry(collection)
            .or_insert_with(|| broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY).0)
            .clone()
    }

    fn notify(&self, collection: Collection, docs: &BTreeMap<String, Value>) {
        let sender = self.sender(collection);
        if sender.receiver_count() > 0 {
            let _ = sender.send(to_documents(docs));
        }
    }
}

fn to_documents(docs: &BTreeMap<String, Value>) -> Vec<Document> {
    docs.iter()
        .map(|(id, data)| Document { id: id.clone(), data: data.clone() })
        .collect()
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        self.check_online()?;
        if !data.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let id = Uuid::new_v4().to_string();
        let mut collections = self.inner.collections.write().await;
        let docs = collections.entry(collection).or_default();
        docs.insert(id.clone(), data);
        self.notify(collection, docs);
        debug!(collection = collection.name(), %id, "document created");
        Ok(id)
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), StoreError> {
        self.check_online()?;
        let Value::Object(patch) = patch else {
            return Err(StoreError::NotAnObject);
        };
        let mut collections = self.inner.collections.write().await;
        let docs = collections.entry(collection).or_default();
        let not_found = || StoreError::NotFound { collection: collection.name(), id: id.to_owned() };
        let doc = docs.get_mut(id).ok_or_else(not_found)?;
        let fields: &mut Map<String, Value> = doc.as_object_mut().ok_or(StoreError::NotAnObject)?;
        fields.extend(patch);
        self.notify(collection, docs);
        debug!(collection = collection.name(), id, "document updated");
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut collections = self.inner.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if docs.remove(id).is_none() {
            return Err(StoreError::NotFound { collection: collection.name(), id: id.to_owned() });
        }
        self.notify(collection, docs);
        debug!(collection = collection.name(), id, "document deleted");
        Ok(())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.check_online()?;
        let collections = self.inner.collections.read().await;
        Ok(collections.get(&collection).map(to_documents).unwrap_or_default())
    }

    async fn subscribe(&self, collection: Collection) -> Result<SnapshotStream, StoreError> {
        self.check_online()?;
        // Hold the read lock while subscribing so no write slips between the
        // initial snapshot and the first broadcast.
        let collections = self.inner.collections.read().await;
        let rx = self.sender(collection).subscribe();
        let initial = collections.get(&collection).map(to_documents).unwrap_or_default();
        Ok(SnapshotStream { initial: Some(initial), rx })
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
