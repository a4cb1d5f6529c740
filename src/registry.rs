use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;

use crate::timer::{Timer, TimerKey};

/// Mapping from timer id to live [`Timer`], plus an insertion-order key list
/// so a tick pass enumerates timers in the order they were registered.
///
/// The evaluator never iterates the map directly: it walks a [`snapshot`]
/// of the ids and looks each one up, so entries discovered during the pass
/// can be removed without corrupting the scan or skipping neighbors, and no
/// map lock is held while consumer callbacks run.
///
/// [`snapshot`]: TimerRegistry::snapshot
pub(crate) struct TimerRegistry<K: TimerKey> {
    map: DashMap<K, Timer<K>>,
    order: Mutex<Vec<K>>,
}

impl<K: TimerKey> TimerRegistry<K> {
    pub(crate) fn new() -> Self {
        Self {
            map: DashMap::new(),
            order: Mutex::new(Vec::new()),
        }
    }

    /// Last write wins; an overwritten id keeps its original snapshot
    /// position.
    pub(crate) fn insert(&self, timer: Timer<K>) {
        let id = timer.id().clone();
        if self.map.insert(id.clone(), timer).is_none() {
            self.order
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(id);
        }
    }

    /// Returns `false` if the id was not present.
    pub(crate) fn remove(&self, id: &K) -> bool {
        if self.map.remove(id).is_none() {
            return false;
        }
        self.order
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|k| k != id);
        true
    }

    /// The current ids in insertion order, detached from the live map.
    pub(crate) fn snapshot(&self) -> Vec<K> {
        self.order
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs `f` against the live entry for `id`, if still present. The map
    /// guard is released before this returns.
    pub(crate) fn with_timer_mut<R>(
        &self,
        id: &K,
        f: impl FnOnce(&mut Timer<K>) -> R,
    ) -> Option<R> {
        self.map.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}
