//! # In-memory transactional document store
//!
//! A networked document store exposes per-document CRUD, a snapshot/subscribe
//! primitive, and an atomic read-modify-write transaction primitive. This
//! crate implements that contract in memory so the deliberation engine can be
//! exercised locally and in tests against the exact semantics it relies on in
//! production:
//!
//! 1. Every document carries a monotonically increasing version (`0` = absent)
//! 2. A transaction records the version of everything it reads
//! 3. Commit re-validates every recorded version under a commit lock and
//!    either applies all buffered writes atomically or fails
//! 4. On a failed commit the whole closure is re-run against fresh state,
//!    with jittered backoff, up to a configured attempt cap
//! 5. Committed changes are pushed to all subscribers of the touched documents
//!
//! Reads inside a transaction see committed state plus the transaction's own
//! buffered writes; no other transaction's writes can interleave between a
//! transaction's reads and its commit.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use document_store::{DocumentStore, StoreResult};
//! use serde_json::json;
//!
//! # async fn example() -> StoreResult<()> {
//! let store = DocumentStore::default();
//! store.set("posts", "p1", &json!({ "likes": 0 })).await?;
//!
//! store
//!     .run_transaction(|tx| -> StoreResult<()> {
//!         let mut post: serde_json::Value = tx.get("posts", "p1")?.expect("seeded above");
//!         post["likes"] = json!(post["likes"].as_i64().unwrap_or(0) + 1);
//!         tx.set("posts", "p1", &post)?;
//!         Ok(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use dashmap::DashMap;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

mod error;

pub use error::{StoreError, StoreResult};

/// Tuning knobs for the optimistic transaction loop.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How many times a conflicting transaction is re-run before giving up
    pub max_tx_attempts: u32,
    /// Base backoff between attempts; jittered and scaled per attempt
    pub retry_backoff: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_tx_attempts: 5,
            retry_backoff: Duration::from_millis(20),
        }
    }
}

/// (collection, document id)
type DocKey = (String, String);

#[derive(Debug, Clone)]
struct VersionedDoc {
    version: u64,
    data: Value,
}

/// Commit-time loser of a write-write race. Internal: surfaced to callers as
/// [`StoreError::Conflict`] only once the retry budget is spent.
struct Contended;

/// In-memory, versioned, subscribable document store.
///
/// All mutation funnels through the commit lock, so subscribers never observe
/// a state in which only part of a transaction's writes have landed.
pub struct DocumentStore {
    config: StoreConfig,
    collections: DashMap<String, DashMap<String, VersionedDoc>>,
    watchers: DashMap<DocKey, watch::Sender<Option<Value>>>,
    commit_lock: Mutex<()>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl DocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            collections: DashMap::new(),
            watchers: DashMap::new(),
            commit_lock: Mutex::new(()),
        }
    }

    /// Read a single document.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> StoreResult<Option<T>> {
        match self.read_raw(collection, id) {
            Some(doc) => Ok(Some(serde_json::from_value(doc.data)?)),
            None => Ok(None),
        }
    }

    /// Write a single document outside of any transaction.
    ///
    /// This is a plain committed write (publish/seed path); contended
    /// read-modify-write cycles must use [`DocumentStore::run_transaction`].
    pub async fn set<T: Serialize>(&self, collection: &str, id: &str, value: &T) -> StoreResult<()> {
        let data = serde_json::to_value(value)?;
        let _guard = self.commit_lock.lock().await;
        self.apply(collection.to_string(), id.to_string(), data);
        Ok(())
    }

    /// Fetch every document in a collection.
    ///
    /// Order is unspecified; callers impose their own.
    pub async fn list<T: DeserializeOwned>(&self, collection: &str) -> StoreResult<Vec<T>> {
        let col = match self.collections.get(collection) {
            Some(col) => col,
            None => return Ok(Vec::new()),
        };
        let mut out = Vec::with_capacity(col.len());
        for entry in col.iter() {
            out.push(serde_json::from_value(entry.value().data.clone())?);
        }
        Ok(out)
    }

    /// Subscribe to snapshot updates for one document.
    ///
    /// The receiver holds the latest committed snapshot (`None` while the
    /// document does not exist) and is notified on every committed change.
    /// Dropping the receiver unsubscribes.
    ///
    /// Registration happens under the commit lock, so a commit can never
    /// slip between reading the initial snapshot and wiring up the channel.
    pub async fn subscribe(&self, collection: &str, id: &str) -> watch::Receiver<Option<Value>> {
        let _guard = self.commit_lock.lock().await;
        let key = (collection.to_string(), id.to_string());
        let current = self.read_raw(collection, id).map(|doc| doc.data);
        let sender = self
            .watchers
            .entry(key)
            .or_insert_with(|| watch::channel(current).0);
        sender.subscribe()
    }

    /// Run an atomic read-modify-write transaction.
    ///
    /// The closure may run more than once; it must be free of side effects
    /// other than reads and writes through the [`Transaction`] handle. An
    /// error returned from the closure aborts immediately without writing
    /// and without retrying.
    pub async fn run_transaction<T, E, F>(&self, mut body: F) -> Result<T, E>
    where
        F: FnMut(&mut Transaction<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let budget = self.config.max_tx_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut tx = Transaction::new(self);
            let value = body(&mut tx)?;
            match self.try_commit(tx).await {
                Ok(()) => return Ok(value),
                Err(Contended) if attempt < budget => {
                    debug!(attempt, "transaction lost a write-write race, retrying");
                    tokio::time::sleep(self.backoff(attempt)).await;
                }
                Err(Contended) => {
                    warn!(attempts = attempt, "transaction retry budget exhausted");
                    return Err(E::from(StoreError::Conflict { attempts: attempt }));
                }
            }
        }
    }

    fn read_raw(&self, collection: &str, id: &str) -> Option<VersionedDoc> {
        self.collections
            .get(collection)
            .and_then(|col| col.get(id).map(|doc| doc.clone()))
    }

    /// Validate every recorded read version and apply all buffered writes.
    async fn try_commit(&self, tx: Transaction<'_>) -> Result<(), Contended> {
        let _guard = self.commit_lock.lock().await;
        for ((collection, id), read_version) in &tx.reads {
            let current = self
                .read_raw(collection, id)
                .map(|doc| doc.version)
                .unwrap_or(0);
            if current != *read_version {
                return Err(Contended);
            }
        }
        for ((collection, id), data) in tx.writes {
            self.apply(collection, id, data);
        }
        Ok(())
    }

    /// Store a new document version and fan it out to subscribers.
    /// Caller holds the commit lock.
    fn apply(&self, collection: String, id: String, data: Value) {
        let col = self.collections.entry(collection.clone()).or_default();
        let version = col.get(&id).map(|doc| doc.version).unwrap_or(0) + 1;
        col.insert(id.clone(), VersionedDoc {
            version,
            data: data.clone(),
        });
        drop(col);

        if let Some(sender) = self.watchers.get(&(collection, id)) {
            sender.send_replace(Some(data));
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.config.retry_backoff;
        let jitter_ceiling = (base.as_millis() as u64) / 2;
        let jitter = rand::thread_rng().gen_range(0..=jitter_ceiling);
        base * attempt + Duration::from_millis(jitter)
    }
}

/// Isolated read/write handle passed to a transaction closure.
///
/// Reads record the observed document version (including "absent") so commit
/// can detect any concurrent change to what the closure based its decisions
/// on. Writes are buffered until commit.
pub struct Transaction<'a> {
    store: &'a DocumentStore,
    reads: HashMap<DocKey, u64>,
    writes: HashMap<DocKey, Value>,
}

impl<'a> Transaction<'a> {
    fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            reads: HashMap::new(),
            writes: HashMap::new(),
        }
    }

    /// Read a document, seeing this transaction's own pending writes first.
    pub fn get<T: DeserializeOwned>(&mut self, collection: &str, id: &str) -> StoreResult<Option<T>> {
        let key = (collection.to_string(), id.to_string());
        if let Some(pending) = self.writes.get(&key) {
            return Ok(Some(serde_json::from_value(pending.clone())?));
        }

        let doc = self.store.read_raw(collection, id);
        let version = doc.as_ref().map(|d| d.version).unwrap_or(0);
        self.reads.entry(key).or_insert(version);

        match doc {
            Some(doc) => Ok(Some(serde_json::from_value(doc.data)?)),
            None => Ok(None),
        }
    }

    /// Buffer a write; applied only if the whole transaction commits.
    pub fn set<T: Serialize>(&mut self, collection: &str, id: &str, value: &T) -> StoreResult<()> {
        let key = (collection.to_string(), id.to_string());
        self.writes.insert(key, serde_json::to_value(value)?);
        Ok(())
    }
}
