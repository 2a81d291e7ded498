//! Hot-swappable schema handle

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::domain::aggregates::FormSchema;
use crate::domain::events::SchemaEvent;

/// Shared current schema
///
/// Readers take an immutable snapshot without locking. Writers clone the
/// current snapshot, mutate the clone and publish it; the writer mutex keeps
/// concurrent edits from overwriting each other.
pub struct SchemaHandle {
    current: ArcSwap<FormSchema>,
    writer: Mutex<()>,
    version: AtomicU64,
    dirty: AtomicBool,
}

impl SchemaHandle {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            current: ArcSwap::from_pointee(schema),
            writer: Mutex::new(()),
            version: AtomicU64::new(0),
            dirty: AtomicBool::new(false),
        }
    }

    /// Current schema
    pub fn snapshot(&self) -> Arc<FormSchema> {
        self.current.load_full()
    }

    /// Bumped on every published change
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Changed since the last save or load
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn mark_clean(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    /// Clear the dirty flag only if nothing was published since `version`
    ///
    /// Returns whether the flag was cleared. Holding the writer lock keeps an
    /// edit from landing between the comparison and the store.
    pub fn mark_clean_if(&self, version: u64) -> bool {
        let _guard = self.writer.lock();
        if self.version() != version {
            return false;
        }
        self.mark_clean();
        true
    }

    /// Run a mutation against a private copy and publish it if anything changed
    ///
    /// Returns the closure's result and the events the mutation raised. No
    /// events means nothing is published and the handle stays as it was.
    pub fn apply<R>(&self, f: impl FnOnce(&mut FormSchema) -> R) -> (R, Vec<SchemaEvent>) {
        let _guard = self.writer.lock();
        let mut next = FormSchema::clone(&self.current.load());
        let result = f(&mut next);
        let events = next.take_events();
        if !events.is_empty() {
            self.publish(next, true);
            debug!(events = events.len(), version = self.version(), "schema updated");
        }
        (result, events)
    }

    /// Publish a whole schema; `dirty` says whether it still needs saving
    pub fn replace(&self, mut schema: FormSchema, dirty: bool) {
        let _guard = self.writer.lock();
        schema.take_events();
        self.publish(schema, dirty);
    }

    fn publish(&self, schema: FormSchema, dirty: bool) {
        self.current.store(Arc::new(schema));
        self.version.fetch_add(1, Ordering::AcqRel);
        self.dirty.store(dirty, Ordering::Release);
    }
}

impl Default for SchemaHandle {
    fn default() -> Self {
        Self::new(FormSchema::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::FieldType;
    use std::thread;

    #[test]
    fn test_apply_publishes_changes() {
        let handle = SchemaHandle::default();
        let before = handle.snapshot();

        let (id, events) = handle.apply(|schema| schema.add_field(FieldType::Text));
        assert_eq!(events.len(), 1);
        assert!(handle.is_dirty());
        assert_eq!(handle.version(), 1);

        // Old snapshots are untouched
        assert!(before.is_empty());
        assert!(handle.snapshot().contains(&id));
    }

    #[test]
    fn test_noop_does_not_publish() {
        let handle = SchemaHandle::default();
        let (removed, events) = handle.apply(|schema| schema.remove_field(&"ghost".into()));
        assert!(!removed);
        assert!(events.is_empty());
        assert_eq!(handle.version(), 0);
        assert!(!handle.is_dirty());
    }

    #[test]
    fn test_replace_sets_dirty_flag() {
        let handle = SchemaHandle::default();
        let mut schema = FormSchema::with_title("Loaded");
        schema.add_field(FieldType::Date);

        handle.replace(schema, false);
        assert!(!handle.is_dirty());
        assert_eq!(handle.snapshot().title(), "Loaded");

        handle.apply(|schema| schema.reset());
        assert!(handle.is_dirty());
        handle.mark_clean();
        assert!(!handle.is_dirty());
    }

    #[test]
    fn test_mark_clean_if_checks_version() {
        let handle = SchemaHandle::default();
        handle.apply(|schema| schema.add_field(FieldType::Text));
        let seen = handle.version();

        handle.apply(|schema| schema.add_field(FieldType::Email));
        assert!(!handle.mark_clean_if(seen));
        assert!(handle.is_dirty());

        assert!(handle.mark_clean_if(handle.version()));
        assert!(!handle.is_dirty());
    }

    #[test]
    fn test_concurrent_edits_are_not_lost() {
        let handle = Arc::new(SchemaHandle::default());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                thread::spawn(move || {
                    for _ in 0..25 {
                        handle.apply(|schema| schema.add_field(FieldType::Number));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(handle.snapshot().len(), 200);
        assert_eq!(handle.version(), 200);
    }
}
