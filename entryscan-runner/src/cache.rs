//! TTL result cache with at most one in-flight computation per key.
//!
//! Each key maps to either a finished entry (value + expiry) or a pending
//! flight. A caller that finds a pending flight blocks on it instead of
//! starting a second scan. Finished values are installed by replacing the
//! whole slot, so readers never observe a partial entry. Errors reach every
//! waiter but are never cached.
//!
//! `invalidate` removes the slot. A flight that was already running for an
//! invalidated key still answers its own waiters, but does not repopulate the
//! key: its slot is no longer the one in the map.

use crate::config::ScanKey;
use crate::scanner::ScanError;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

type Shared<V> = Result<Arc<V>, ScanError>;

struct Flight<V> {
    result: Mutex<Option<Shared<V>>>,
    done: Condvar,
}

impl<V> Flight<V> {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn complete(&self, result: Shared<V>) {
        *self.result.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
        self.done.notify_all();
    }

    fn wait(&self) -> Shared<V> {
        let mut guard = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(result) = guard.as_ref() {
                return result.clone();
            }
            guard = self
                .done
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

enum Slot<V> {
    /// `expires_at` is `None` when the TTL does not fit in an `Instant`.
    Ready {
        expires_at: Option<Instant>,
        value: Arc<V>,
    },
    Pending(Arc<Flight<V>>),
}

fn is_fresh(expires_at: Option<Instant>) -> bool {
    expires_at.map_or(true, |at| Instant::now() < at)
}

enum Lookup<V> {
    Hit(Arc<V>),
    Wait(Arc<Flight<V>>),
    Miss,
}

pub struct ScanCache<V> {
    ttl: Duration,
    slots: Mutex<HashMap<ScanKey, Slot<V>>>,
}

impl<V> ScanCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ScanKey, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the fresh entry for `key`, join a computation already running
    /// for it, or run `compute` and install its result.
    pub fn get_or_compute<F>(&self, key: &ScanKey, compute: F) -> Shared<V>
    where
        F: FnOnce() -> Result<V, ScanError>,
    {
        let flight = {
            let mut slots = self.lock();
            let lookup = match slots.get(key) {
                Some(Slot::Ready { expires_at, value }) if is_fresh(*expires_at) => {
                    Lookup::Hit(Arc::clone(value))
                }
                Some(Slot::Pending(flight)) => Lookup::Wait(Arc::clone(flight)),
                _ => Lookup::Miss,
            };
            match lookup {
                Lookup::Hit(value) => {
                    debug!(key = %short(key), "scan cache hit");
                    return Ok(value);
                }
                Lookup::Wait(flight) => {
                    drop(slots);
                    debug!(key = %short(key), "joining in-flight scan");
                    return flight.wait();
                }
                Lookup::Miss => {
                    let flight = Arc::new(Flight::new());
                    slots.insert(key.clone(), Slot::Pending(Arc::clone(&flight)));
                    flight
                }
            }
        };

        debug!(key = %short(key), "scan cache miss");
        let mut guard = FlightGuard {
            cache: self,
            key,
            flight,
            finished: false,
        };
        let result = compute().map(Arc::new);
        guard.finish(result.clone());
        result
    }

    /// Drop the entry for `key`. Returns whether anything was removed.
    pub fn invalidate(&self, key: &ScanKey) -> bool {
        let removed = self.lock().remove(key).is_some();
        if removed {
            debug!(key = %short(key), "scan cache entry invalidated");
        }
        removed
    }

    /// Whether a fresh finished entry exists for `key`.
    pub fn contains_fresh(&self, key: &ScanKey) -> bool {
        matches!(
            self.lock().get(key),
            Some(Slot::Ready { expires_at, .. }) if is_fresh(*expires_at)
        )
    }

    /// Install `result` for `key` if `flight` still owns the slot.
    fn settle(&self, key: &ScanKey, flight: &Arc<Flight<V>>, result: &Shared<V>) {
        let mut slots = self.lock();
        let owned = matches!(slots.get(key), Some(Slot::Pending(f)) if Arc::ptr_eq(f, flight));
        if !owned {
            return;
        }
        match result {
            Ok(value) => {
                slots.insert(
                    key.clone(),
                    Slot::Ready {
                        expires_at: Instant::now().checked_add(self.ttl),
                        value: Arc::clone(value),
                    },
                );
            }
            Err(_) => {
                slots.remove(key);
            }
        }
    }
}

/// Completes the flight even if `compute` panics, so waiters never hang.
struct FlightGuard<'a, V> {
    cache: &'a ScanCache<V>,
    key: &'a ScanKey,
    flight: Arc<Flight<V>>,
    finished: bool,
}

impl<V> FlightGuard<'_, V> {
    fn finish(&mut self, result: Shared<V>) {
        self.cache.settle(self.key, &self.flight, &result);
        self.flight.complete(result);
        self.finished = true;
    }
}

impl<V> Drop for FlightGuard<'_, V> {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(Err(ScanError::ComputationPanicked));
        }
    }
}

fn short(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}
