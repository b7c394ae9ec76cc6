//! Generic persistent repository.
//!
//! A [`Repository`] is the only owner of its in-memory collection and the only
//! writer of its storage slot. Every mutation rewrites the whole collection.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec::{EntityCodec, JsonCodec};
use crate::error::{CodecError, RepositoryError, StoreError};
use crate::store::BlobStore;

/// A value stored in a repository.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identifier assigned at creation; never changes and is never reused.
    fn id(&self) -> Uuid;

    /// Recompute stored fields that are a pure function of other fields.
    ///
    /// Called on every value entering the repository through `add` or
    /// `update`.
    fn refresh_derived(&mut self) {}
}

/// An entity type with a fixed storage slot and built-in default collection.
pub trait Record: Entity + Serialize + DeserializeOwned {
    /// Name of the storage slot, `{repository-name}_data`.
    const STORAGE_KEY: &'static str;

    /// Collection used when the slot is absent or cannot be decoded.
    fn defaults() -> Vec<Self>;
}

/// Configuration for opening a repository.
pub struct RepositorySlot<T> {
    /// Storage slot name
    pub storage_key: String,
    /// Factory for the fallback collection
    pub defaults: fn() -> Vec<T>,
}

impl<T: Record> RepositorySlot<T> {
    /// Slot and defaults declared by a [`Record`] type.
    pub fn of() -> Self {
        Self {
            storage_key: T::STORAGE_KEY.to_string(),
            defaults: T::defaults,
        }
    }
}

/// Where the current collection came from when it was last loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Decoded from the storage slot
    Decoded,
    /// Built from defaults after the slot was absent or unreadable
    Defaults,
}

#[derive(Debug, thiserror::Error)]
enum LoadFailure {
    #[error("slot is empty")]
    Absent,
    #[error("read failed: {0}")]
    Read(#[from] StoreError),
    #[error("decode failed: {0}")]
    Decode(#[from] CodecError),
}

/// In-memory collection of `T` backed by one storage slot.
pub struct Repository<T, C = JsonCodec<T>> {
    key: String,
    store: Arc<dyn BlobStore>,
    codec: C,
    defaults: fn() -> Vec<T>,
    items: Vec<T>,
    origin: LoadOrigin,
    revision: watch::Sender<u64>,
    last_persist_error: Option<RepositoryError>,
    load_error: Option<RepositoryError>,
}

impl<T: Record> Repository<T> {
    /// Open the repository for a [`Record`] type with the JSON codec.
    pub fn open(store: Arc<dyn BlobStore>) -> Self {
        Self::with_slot(store, RepositorySlot::of(), JsonCodec::new())
    }
}

impl<T, C> Repository<T, C>
where
    T: Entity,
    C: EntityCodec<T>,
{
    /// Open a repository with an explicit slot, defaults, and codec.
    ///
    /// If the slot is absent or cannot be decoded the defaults are loaded and
    /// written back immediately, replacing whatever was stored. If the store
    /// itself fails to read, the defaults are held in memory only and writes
    /// are withheld until a [`reload`](Self::reload) succeeds.
    pub fn with_slot(store: Arc<dyn BlobStore>, slot: RepositorySlot<T>, codec: C) -> Self {
        let (revision, _) = watch::channel(0);
        let mut repository = Self {
            key: slot.storage_key,
            store,
            codec,
            defaults: slot.defaults,
            items: Vec::new(),
            origin: LoadOrigin::Defaults,
            revision,
            last_persist_error: None,
            load_error: None,
        };
        repository.load();
        repository
    }

    fn read(&self) -> Result<Vec<T>, LoadFailure> {
        let bytes = self.store.get(&self.key)?.ok_or(LoadFailure::Absent)?;
        Ok(self.codec.decode(&bytes)?)
    }

    fn load(&mut self) {
        self.load_error = None;
        match self.read() {
            Ok(items) => {
                info!(key = %self.key, count = items.len(), "Loaded collection");
                self.items = items;
                self.origin = LoadOrigin::Decoded;
            }
            Err(LoadFailure::Read(source)) => {
                warn!(key = %self.key, error = %source, "Slot unreadable, using defaults without writing");
                self.items = (self.defaults)();
                self.origin = LoadOrigin::Defaults;
                self.load_error = Some(RepositoryError::Read {
                    key: self.key.clone(),
                    source,
                });
            }
            Err(reason) => {
                info!(key = %self.key, %reason, "Falling back to default collection");
                self.items = (self.defaults)();
                self.origin = LoadOrigin::Defaults;
                self.persist();
            }
        }
        self.bump();
    }

    /// Discard the in-memory collection and load the slot again.
    ///
    /// A successful read lifts any write hold left by an earlier failed read.
    pub fn reload(&mut self) {
        self.load();
    }

    /// Storage slot name.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Where the collection came from on the last load.
    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    /// The error from the most recent write, if it failed.
    ///
    /// Cleared by the next successful write. While set, the in-memory
    /// collection is ahead of storage and will not survive a restart.
    pub fn last_persist_error(&self) -> Option<&RepositoryError> {
        self.last_persist_error.as_ref()
    }

    /// The store error from the last load, if the slot could not be read.
    ///
    /// While set, the collection holds defaults and nothing is written back.
    pub fn last_load_error(&self) -> Option<&RepositoryError> {
        self.load_error.as_ref()
    }

    /// Watch the revision counter; it advances after every mutation and load.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Append `entity` to the end of the collection.
    pub fn add(&mut self, mut entity: T) {
        entity.refresh_derived();
        debug!(key = %self.key, id = %entity.id(), "Adding entity");
        self.items.push(entity);
        self.commit();
    }

    /// Replace the entity with the same identifier, keeping its position.
    ///
    /// Returns `false` and changes nothing when no entity matches.
    pub fn update(&mut self, mut entity: T) -> bool {
        let id = entity.id();
        let Some(slot) = self.items.iter_mut().find(|e| e.id() == id) else {
            debug!(key = %self.key, %id, "Update ignored, no such entity");
            return false;
        };
        entity.refresh_derived();
        *slot = entity;
        self.commit();
        true
    }

    /// Build a replacement for the entity `id` from a copy of it and store it
    /// with a single [`update`](Self::update).
    ///
    /// `edit` returns whether the replacement should be committed. Returns
    /// `false` when the entity does not exist or `edit` declined.
    pub fn replace_with<F>(&mut self, id: Uuid, edit: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let Some(mut replacement) = self.get(id).cloned() else {
            return false;
        };
        if !edit(&mut replacement) {
            return false;
        }
        self.update(replacement)
    }

    /// Remove every entity with identifier `id`. Persists even when nothing
    /// matched. Returns how many were removed.
    pub fn delete(&mut self, id: Uuid) -> usize {
        let removed = self.retain(|e| e.id() != id);
        debug!(key = %self.key, %id, removed, "Deleted entity");
        removed
    }

    /// Keep only the entities matching `keep`, with one write for the whole
    /// batch. Returns how many were removed.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(keep);
        let removed = before - self.items.len();
        self.commit();
        removed
    }

    /// Entities matching `predicate`, in collection order.
    pub fn query<'a, 'p, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a T> + 'p
    where
        'a: 'p,
        P: Fn(&T) -> bool + 'p,
    {
        self.items.iter().filter(move |e| predicate(*e))
    }

    /// Look up an entity by identifier.
    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    /// Whole collection in insertion order.
    pub fn all(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn commit(&mut self) {
        self.persist();
        self.bump();
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Write the full collection to the slot.
    ///
    /// Failures are logged and kept in `last_persist_error`; they never undo
    /// the in-memory change.
    fn persist(&mut self) {
        if self.load_error.is_some() {
            warn!(key = %self.key, "Slot was not read, change is not durable");
            self.last_persist_error = Some(RepositoryError::Withheld {
                key: self.key.clone(),
            });
            return;
        }

        let result = self
            .codec
            .encode(&self.items)
            .map_err(|source| RepositoryError::Encode {
                key: self.key.clone(),
                source,
            })
            .and_then(|bytes| {
                self.store
                    .set(&self.key, &bytes)
                    .map_err(|source| RepositoryError::Write {
                        key: self.key.clone(),
                        source,
                    })
            });

        match result {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Persist failed, change is not durable");
                self.last_persist_error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        text: String,
    }

    impl Note {
        fn new(text: &str) -> Self {
            Self {
                id: Uuid::new_v4(),
                text: text.to_string(),
            }
        }
    }

    impl Entity for Note {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    impl Record for Note {
        const STORAGE_KEY: &'static str = "notes_data";

        fn defaults() -> Vec<Self> {
            vec![Note::new("seed")]
        }
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl BlobStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Store whose reads fail until `heal` is called; records writes.
    #[derive(Default)]
    struct FlakyStore {
        healed: std::sync::atomic::AtomicBool,
        inner: MemoryStore,
    }

    impl FlakyStore {
        fn heal(&self) {
            self.healed.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    impl BlobStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            if self.healed.load(std::sync::atomic::Ordering::SeqCst) {
                self.inner.get(key)
            } else {
                Err(StoreError::Io(std::io::Error::other("EMFILE")))
            }
        }

        fn set(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
            self.inner.set(key, bytes)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_absent_slot_loads_and_persists_defaults() {
        let store = memory();
        let repo = Repository::<Note>::open(store.clone());

        assert_eq!(repo.origin(), LoadOrigin::Defaults);
        assert_eq!(repo.len(), 1);
        assert!(store.get("notes_data").unwrap().is_some());
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut repo = Repository::<Note>::open(memory());
        repo.add(Note::new("a"));
        repo.add(Note::new("b"));

        let texts: Vec<_> = repo.all().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["seed", "a", "b"]);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut repo = Repository::<Note>::open(memory());
        let note = Note::new("draft");
        repo.add(note.clone());
        repo.add(Note::new("after"));

        let mut edited = note.clone();
        edited.text = "final".to_string();
        assert!(repo.update(edited));

        assert_eq!(repo.all()[1].text, "final");
        assert_eq!(repo.all()[1].id, note.id);
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut repo = Repository::<Note>::open(memory());
        let before = repo.all().to_vec();
        let revision = repo.revision();

        assert!(!repo.update(Note::new("ghost")));
        assert_eq!(repo.all(), before.as_slice());
        assert_eq!(repo.revision(), revision);
    }

    #[test]
    fn test_delete_unknown_leaves_collection() {
        let mut repo = Repository::<Note>::open(memory());
        let before = repo.all().to_vec();

        assert_eq!(repo.delete(Uuid::new_v4()), 0);
        assert_eq!(repo.all(), before.as_slice());
    }

    #[test]
    fn test_query_reflects_memory_not_storage() {
        let store = memory();
        let mut repo = Repository::<Note>::open(store.clone());
        repo.add(Note::new("kept"));
        store.set("notes_data", b"[]").unwrap();

        assert_eq!(repo.query(|n| n.text == "kept").count(), 1);
    }

    #[test]
    fn test_write_failure_is_recorded_not_fatal() {
        let mut repo = Repository::<Note>::open(Arc::new(ReadOnlyStore));
        assert!(matches!(
            repo.last_persist_error(),
            Some(RepositoryError::Write { .. })
        ));

        repo.add(Note::new("session only"));
        assert_eq!(repo.len(), 2);
        assert!(repo.last_persist_error().is_some());
    }

    #[test]
    fn test_subscribers_see_mutations() {
        let mut repo = Repository::<Note>::open(memory());
        let mut rx = repo.subscribe();
        rx.mark_unchanged();

        repo.add(Note::new("x"));
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_replace_with_declined_edit() {
        let mut repo = Repository::<Note>::open(memory());
        let id = repo.all()[0].id;

        assert!(!repo.replace_with(id, |_| false));
        assert!(repo.replace_with(id, |n| {
            n.text = "changed".to_string();
            true
        }));
        assert_eq!(repo.get(id).unwrap().text, "changed");
        assert!(!repo.replace_with(Uuid::new_v4(), |_| true));
    }

    #[test]
    fn test_read_error_never_overwrites_slot() {
        let store = Arc::new(FlakyStore::default());
        let saved = serde_json::to_vec(&vec![Note::new("user data")]).unwrap();
        store.inner.set("notes_data", &saved).unwrap();

        let mut repo = Repository::<Note>::open(store.clone());
        assert_eq!(repo.origin(), LoadOrigin::Defaults);
        assert!(matches!(repo.last_load_error(), Some(RepositoryError::Read { .. })));
        assert!(repo.last_persist_error().is_none());
        assert_eq!(store.inner.get("notes_data").unwrap(), Some(saved.clone()));

        repo.add(Note::new("session only"));
        assert!(matches!(
            repo.last_persist_error(),
            Some(RepositoryError::Withheld { .. })
        ));
        assert_eq!(store.inner.get("notes_data").unwrap(), Some(saved));

        store.heal();
        repo.reload();
        assert!(repo.last_load_error().is_none());
        assert_eq!(repo.origin(), LoadOrigin::Decoded);
        assert_eq!(repo.all()[0].text, "user data");
    }

    #[test]
    fn test_reload_picks_up_external_writes() {
        let store = memory();
        let mut repo = Repository::<Note>::open(store.clone());
        assert_eq!(repo.origin(), LoadOrigin::Defaults);

        let written = vec![Note::new("from disk"), Note::new("also")];
        store
            .set("notes_data", &serde_json::to_vec(&written).unwrap())
            .unwrap();
        let mut rx = repo.subscribe();
        rx.mark_unchanged();

        repo.reload();
        assert_eq!(repo.origin(), LoadOrigin::Decoded);
        assert_eq!(repo.all(), written.as_slice());
        assert!(rx.has_changed().unwrap());

        store.set("notes_data", b"garbage").unwrap();
        repo.reload();
        assert_eq!(repo.origin(), LoadOrigin::Defaults);
        assert_eq!(repo.all()[0].text, "seed");
    }

    #[test]
    fn test_retain_writes_once() {
        let mut repo = Repository::<Note>::open(memory());
        repo.add(Note::new("a"));
        repo.add(Note::new("b"));
        let revision = repo.revision();

        assert_eq!(repo.retain(|n| n.text == "a"), 2);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.revision(), revision + 1);
    }
}
