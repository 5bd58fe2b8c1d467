use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::history::model::HistoryEntry;
use crate::history::serialization::{self, Loaded};
use crate::history::storage::{FileStore, KeyValueStore};
use crate::history::{HISTORY_KEY, MAX_ENTRIES};
use crate::http::{RequestDescriptor, ResponseModel};

/// Full history, newest first.
pub type HistorySnapshot = Arc<Vec<HistoryEntry>>;

struct State {
    entries: HistorySnapshot,
    subscribers: Vec<mpsc::UnboundedSender<HistorySnapshot>>,
}

impl State {
    /// Push a snapshot to every live subscriber, dropping closed ones.
    fn publish(&mut self, snapshot: HistorySnapshot) {
        self.entries = snapshot;
        let entries = &self.entries;
        self.subscribers
            .retain(|tx| tx.send(Arc::clone(entries)).is_ok());
    }
}

/// Bounded, persisted request history.
///
/// Constructed once and shared by `Arc`. Every mutation publishes the new
/// snapshot while the state lock is held, so subscribers see snapshots in
/// exactly the order of `append`/`clear` calls. Persistence is best-effort:
/// storage failures are logged and the in-memory list stays authoritative.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<State>,
}

impl HistoryStore {
    /// Load any persisted history from `store`.
    ///
    /// Unreadable or non-list data is removed so later loads start clean.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = Self::load(store.as_ref());
        debug!("History loaded with {} entries", entries.len());

        Self {
            store,
            state: Mutex::new(State {
                entries: Arc::new(entries),
                subscribers: Vec::new(),
            }),
        }
    }

    /// File-backed history under `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(dir)))
    }

    fn load(store: &dyn KeyValueStore) -> Vec<HistoryEntry> {
        let raw = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Failed to read history: {}", e);
                Self::discard(store);
                return Vec::new();
            }
        };

        match serialization::decode(&raw) {
            Loaded::Valid(entries) => entries,
            Loaded::Rejected(reason) => {
                warn!("Invalid history format in storage ({}), clearing...", reason);
                Self::discard(store);
                Vec::new()
            }
        }
    }

    fn discard(store: &dyn KeyValueStore) {
        if let Err(e) = store.remove(HISTORY_KEY) {
            error!("Failed to clear corrupted history: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &[HistoryEntry]) {
        let result =
            serialization::encode(entries).and_then(|raw| self.store.set(HISTORY_KEY, &raw));
        if let Err(e) = result {
            warn!("Failed to save request history: {}", e);
        }
    }

    /// Record a completed request, evicting the oldest entry past capacity.
    pub fn append(&self, request: RequestDescriptor, response: ResponseModel) -> HistoryEntry {
        let entry = HistoryEntry::new(request, Some(response));

        let mut state = self.lock();
        let mut next = Vec::with_capacity(MAX_ENTRIES);
        next.push(entry.clone());
        next.extend(state.entries.iter().take(MAX_ENTRIES - 1).cloned());

        let snapshot = Arc::new(next);
        state.publish(Arc::clone(&snapshot));
        self.persist(&snapshot);

        entry
    }

    /// Drop every entry and the persisted copy.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.publish(Arc::new(Vec::new()));
        if let Err(e) = self.store.remove(HISTORY_KEY) {
            warn!("Failed to remove persisted history: {}", e);
        }
    }

    /// Receive the current snapshot now and every later one in order.
    pub fn subscribe(&self) -> HistorySubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        // the receiver is alive, this cannot fail
        let _ = tx.send(Arc::clone(&state.entries));
        state.subscribers.push(tx);
        HistorySubscription { receiver: rx }
    }

    pub fn entries(&self) -> HistorySnapshot {
        Arc::clone(&self.lock().entries)
    }

    pub fn get(&self, id: &str) -> Option<HistoryEntry> {
        self.lock().entries.iter().find(|e| e.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }
}

/// Live view of the history. Dropping it unsubscribes.
pub struct HistorySubscription {
    receiver: mpsc::UnboundedReceiver<HistorySnapshot>,
}

impl HistorySubscription {
    /// Wait for the next snapshot; `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<HistorySnapshot> {
        self.receiver.recv().await
    }

    /// Next pending snapshot without waiting
    pub fn try_recv(&mut self) -> Option<HistorySnapshot> {
        self.receiver.try_recv().ok()
    }

    /// Drain pending snapshots and keep only the newest
    pub fn latest(&mut self) -> Option<HistorySnapshot> {
        let mut latest = None;
        while let Some(snapshot) = self.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TelaError;
    use crate::history::storage::MemoryStore;

    fn request(url: &str) -> RequestDescriptor {
        RequestDescriptor::new("GET", url)
    }

    fn response(status: u16) -> ResponseModel {
        ResponseModel {
            status,
            status_text: "OK".to_string(),
            headers: Default::default(),
            body: serde_json::Value::Null,
            response_time: 1,
        }
    }

    /// Store whose writes always fail, like a full browser quota
    struct FullStore;

    impl KeyValueStore for FullStore {
        fn get(&self, _key: &str) -> crate::Result<Option<String>> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> crate::Result<()> {
            Err(TelaError::StorageError("quota exceeded".to_string()))
        }
        fn remove(&self, _key: &str) -> crate::Result<()> {
            Err(TelaError::StorageError("unavailable".to_string()))
        }
    }

    #[test]
    fn test_append_is_newest_first() {
        let history = HistoryStore::new(Arc::new(MemoryStore::new()));
        history.append(request("u1"), response(200));
        history.append(request("u2"), response(200));

        let entries = history.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].request.url, "u2");
        assert_eq!(entries[1].request.url, "u1");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let history = HistoryStore::new(Arc::new(MemoryStore::new()));
        for i in 0..MAX_ENTRIES {
            history.append(request(&format!("u{i}")), response(200));
        }
        assert_eq!(history.len(), MAX_ENTRIES);

        history.append(request("newest"), response(200));
        let entries = history.entries();
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].request.url, "newest");
        assert_eq!(entries[MAX_ENTRIES - 1].request.url, "u1");
        assert!(entries.iter().all(|e| e.request.url != "u0"));
    }

    #[test]
    fn test_ids_are_unique() {
        let history = HistoryStore::new(Arc::new(MemoryStore::new()));
        for _ in 0..20 {
            history.append(request("same-tick"), response(200));
        }
        let mut ids: Vec<_> = history.entries().iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_subscribers_see_every_snapshot_in_order() {
        let history = HistoryStore::new(Arc::new(MemoryStore::new()));
        history.append(request("before"), response(200));

        let mut sub = history.subscribe();
        history.append(request("a"), response(200));
        history.clear();
        history.append(request("b"), response(200));

        let lens: Vec<usize> = std::iter::from_fn(|| sub.try_recv())
            .map(|s| s.len())
            .collect();
        assert_eq!(lens, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let history = HistoryStore::new(Arc::new(MemoryStore::new()));
        let sub = history.subscribe();
        let _kept = history.subscribe();
        assert_eq!(history.subscriber_count(), 2);

        drop(sub);
        history.append(request("u"), response(200));
        assert_eq!(history.subscriber_count(), 1);
    }

    #[test]
    fn test_persistence_failures_are_not_fatal() {
        let history = HistoryStore::new(Arc::new(FullStore));
        let entry = history.append(request("u"), response(500));
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(&entry.id).unwrap().status(), Some(500));

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_reload_from_store() {
        let store = Arc::new(MemoryStore::new());
        let first = HistoryStore::new(store.clone());
        first.append(request("u1"), response(201));
        first.append(request("u2"), response(404));

        let second = HistoryStore::new(store);
        assert_eq!(*second.entries(), *first.entries());
    }

    #[test]
    fn test_latest_drains() {
        let history = HistoryStore::new(Arc::new(MemoryStore::new()));
        let mut sub = history.subscribe();
        history.append(request("u1"), response(200));
        history.append(request("u2"), response(200));

        assert_eq!(sub.latest().unwrap().len(), 2);
        assert!(sub.try_recv().is_none());
    }
}
