//! In-flight registry: at most one outstanding GET per request key.
//!
//! Acquisition hands out an [`InFlightLease`]; dropping the lease is the
//! release. Every exit from a request (success, failure, cancellation, a
//! dropped future, a panic unwinding through it) therefore releases the
//! entry exactly once. Each lease remembers which acquisition it came from,
//! so a stale lease never removes an entry that a later request now owns.
//!
//! The map sits behind a std mutex that is never held across an await, so
//! acquire and release are indivisible with respect to each other.

use crate::model::{Method, RequestKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Result of asking the registry for permission to send.
#[derive(Debug)]
pub enum Admission {
    /// First caller for this key; hold the lease until settled.
    Acquired(InFlightLease),
    /// Method is not deduplicated; proceed without an entry.
    Bypass,
    /// An identical request is already outstanding.
    Busy,
}

#[derive(Debug, Default)]
struct Entries {
    /// Key to the generation of the acquisition that owns it.
    owners: HashMap<RequestKey, u64>,
    next_generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    entries: Arc<Mutex<Entries>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, method: Method, key: &RequestKey) -> Admission {
        if !method.is_deduplicable() {
            return Admission::Bypass;
        }

        let mut entries = self.lock();
        if entries.owners.contains_key(key) {
            return Admission::Busy;
        }
        let generation = entries.next_generation;
        entries.next_generation += 1;
        entries.owners.insert(key.clone(), generation);
        drop(entries);

        trace!(%key, generation, "in-flight entry acquired");
        Admission::Acquired(InFlightLease {
            registry: self.clone(),
            key: key.clone(),
            generation,
        })
    }

    /// Remove the entry for `key` whoever owns it. Returns whether one was
    /// present.
    pub fn release(&self, key: &RequestKey) -> bool {
        let removed = self.lock().owners.remove(key).is_some();
        if removed {
            trace!(%key, "in-flight entry released");
        }
        removed
    }

    /// Remove the entry for `key` only if `generation` still owns it.
    fn release_owned(&self, key: &RequestKey, generation: u64) -> bool {
        let mut entries = self.lock();
        if entries.owners.get(key) != Some(&generation) {
            return false;
        }
        entries.owners.remove(key);
        drop(entries);
        trace!(%key, generation, "in-flight entry released");
        true
    }

    pub fn is_in_flight(&self, key: &RequestKey) -> bool {
        self.lock().owners.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().owners.is_empty()
    }

    // A panic while holding this lock cannot leave the map half-updated.
    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of one registry entry. Released on drop.
#[derive(Debug)]
pub struct InFlightLease {
    registry: InFlightRegistry,
    key: RequestKey,
    generation: u64,
}

impl Drop for InFlightLease {
    fn drop(&mut self) {
        self.registry.release_owned(&self.key, self.generation);
    }
}
