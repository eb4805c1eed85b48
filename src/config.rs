//! The configuration registry (spec §4.6, §4.7): a thread-safe keyed store mapping
//! `(backend_name, op)` to a declared policy and its lazily-built limiter.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock::{Clock, DefaultClock};
use crate::errors::FsrlError;
use crate::facade::InterceptionFacade;
use crate::fs::FileSystem;
use crate::limiter::Limiter;
use crate::op::{Mode, OperationClass};
use crate::quota::Quota;

type Key = (String, OperationClass);

/// One configured key: the declared policy plus a shared handle to its current limiter.
///
/// Cloning an entry is cheap — it shares the same `Arc<Limiter<C>>` — which is how in-flight
/// callers keep using the limiter they already resolved even after the registry rebuilds or
/// removes the entry (spec §4.7 "Concurrency").
pub struct ConfigEntry<C: Clock> {
    rate: u64,
    burst: u64,
    mode: Mode,
    limiter: Arc<Limiter<C>>,
}

impl<C: Clock> Clone for ConfigEntry<C> {
    fn clone(&self) -> Self {
        ConfigEntry {
            rate: self.rate,
            burst: self.burst,
            mode: self.mode,
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<C: Clock> ConfigEntry<C> {
    fn build(rate: u64, burst: u64, mode: Mode, clock: &C) -> Result<Self, FsrlError> {
        let quota = Quota::new(rate, burst)?;
        Ok(ConfigEntry {
            rate,
            burst,
            mode,
            limiter: Arc::new(Limiter::new(quota, clock.clone())),
        })
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    pub fn burst(&self) -> u64 {
        self.burst
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn limiter(&self) -> &Arc<Limiter<C>> {
        &self.limiter
    }
}

/// A read-only introspection snapshot of one registry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub backend: String,
    pub op: OperationClass,
    pub rate: u64,
    pub burst: u64,
    pub mode: Mode,
}

/// The thread-safe `(backend_name, op) -> ConfigEntry` store.
///
/// Grounded on the teacher's `HashMapStateStore` (a `parking_lot::Mutex`-wrapped `HashMap`,
/// see `state/keyed/hashmap.rs`): the mutex here guards only map structure (insert / remove /
/// lookup), never limiter execution, which proceeds lock-free on the limiter's own atomics
/// once a caller has its `Arc<Limiter<C>>` in hand.
pub struct ConfigRegistry<C: Clock = DefaultClock> {
    entries: Mutex<HashMap<Key, ConfigEntry<C>>>,
    clock: Mutex<C>,
}

impl<C: Clock> ConfigRegistry<C> {
    pub fn new(clock: C) -> Self {
        ConfigRegistry {
            entries: Mutex::new(HashMap::new()),
            clock: Mutex::new(clock),
        }
    }

    /// Sets the steady-state rate (and mode) for a key, creating or rebuilding its limiter as
    /// needed.
    ///
    /// `rate = 0` with no prior entry is a no-op. `rate = 0` that also leaves `burst == 0`
    /// erases the entry. Otherwise the entry is inserted or updated and its limiter rebuilt.
    pub fn set_rate(
        &self,
        backend: &str,
        op: OperationClass,
        rate: u64,
        mode: Mode,
    ) -> Result<(), FsrlError> {
        let key = (backend.to_string(), op);
        let mut entries = self.entries.lock();
        let burst = entries.get(&key).map(|e| e.burst).unwrap_or(0);

        if rate == 0 && !entries.contains_key(&key) {
            return Ok(());
        }
        if rate == 0 && burst == 0 {
            entries.remove(&key);
            tracing::info!(backend, op = %op, "cleared rate-limit key (rate and burst both zero)");
            return Ok(());
        }

        let clock = self.clock.lock().clone();
        let entry = ConfigEntry::build(rate, burst, mode, &clock)?;
        tracing::debug!(backend, op = %op, rate, burst, mode = %mode, "set rate");
        entries.insert(key, entry);
        Ok(())
    }

    /// Sets the burst cap for a key. Only `READ`/`WRITE` support a burst cap.
    pub fn set_burst(&self, backend: &str, op: OperationClass, burst: u64) -> Result<(), FsrlError> {
        if !op.supports_burst() {
            return Err(FsrlError::InvalidConfig(format!(
                "burst is not configurable for operation class '{op}'"
            )));
        }
        let key = (backend.to_string(), op);
        let mut entries = self.entries.lock();
        let (rate, mode) = match entries.get(&key) {
            Some(e) => (e.rate, e.mode),
            None => (0, Mode::NonBlocking),
        };

        if burst == 0 && rate == 0 {
            entries.remove(&key);
            tracing::info!(backend, op = %op, "cleared rate-limit key (rate and burst both zero)");
            return Ok(());
        }

        let clock = self.clock.lock().clone();
        let entry = ConfigEntry::build(rate, burst, mode, &clock)?;
        tracing::debug!(backend, op = %op, rate, burst, "set burst");
        entries.insert(key, entry);
        Ok(())
    }

    /// Returns a snapshot of the declared policy and a shared limiter handle for `(backend,
    /// op)`, if configured.
    pub fn get(&self, backend: &str, op: OperationClass) -> Option<ConfigEntry<C>> {
        let key = (backend.to_string(), op);
        self.entries.lock().get(&key).cloned()
    }

    /// Returns just the limiter handle for `(backend, op)`, or `None` if unconfigured.
    pub fn get_or_null_limiter(&self, backend: &str, op: OperationClass) -> Option<Arc<Limiter<C>>> {
        self.get(backend, op).map(|e| e.limiter)
    }

    /// Removes the entry for exactly `(backend, op)`.
    pub fn clear_one(&self, backend: &str, op: OperationClass) {
        self.entries.lock().remove(&(backend.to_string(), op));
        tracing::info!(backend, op = %op, "cleared rate-limit key");
    }

    /// Removes all entries for `backend`, across every op.
    pub fn clear_all_for_backend(&self, backend: &str) {
        self.entries.lock().retain(|(b, _), _| b != backend);
        tracing::info!(backend, "cleared all rate-limit keys for backend");
    }

    /// Removes every entry in the registry.
    pub fn clear_all(&self) {
        self.entries.lock().clear();
        tracing::info!("cleared all rate-limit keys");
    }

    /// Snapshots every configured key for introspection.
    pub fn enumerate(&self) -> Vec<EntryView> {
        self.entries
            .lock()
            .iter()
            .map(|((backend, op), entry)| EntryView {
                backend: backend.clone(),
                op: *op,
                rate: entry.rate,
                burst: entry.burst,
                mode: entry.mode,
            })
            .collect()
    }

    /// Distinct backend names with at least one configured key.
    pub fn backend_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .lock()
            .keys()
            .map(|(backend, _)| backend.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Replaces the clock used to build future limiters, and rebuilds every existing entry's
    /// limiter against it under the registry lock.
    pub fn set_clock(&self, clock: C) {
        let mut entries = self.entries.lock();
        for entry in entries.values_mut() {
            // Rebuilding can't fail: (rate, burst) already passed validation once.
            let quota = Quota::new(entry.rate, entry.burst).expect("previously valid quota");
            entry.limiter = Arc::new(Limiter::new(quota, clock.clone()));
        }
        *self.clock.lock() = clock;
        tracing::info!("replaced clock and rebuilt all limiters");
    }

    /// Wraps `inner` in an [`InterceptionFacade`] sharing this registry, named per spec
    /// §6's `wrap(backend_name)` convention: `RateLimited(<backend_name>)`.
    ///
    /// Spec §6 describes `wrap` as also extracting `inner` from the host's own backend
    /// registry by name and re-registering the façade back under the derived name — that
    /// half is host-database glue (spec §1, explicitly out of scope). This method performs
    /// the crate's half: building the façade against an already-obtained backend and
    /// computing the name it should be re-registered under.
    pub fn wrap<F: FileSystem>(
        self: &Arc<Self>,
        backend_name: &str,
        inner: F,
    ) -> InterceptionFacade<F, C> {
        InterceptionFacade::new(derived_backend_name(backend_name), inner, Arc::clone(self))
    }
}

/// The recommended derived name for a façade wrapping `original`, per spec §6.
pub fn derived_backend_name(original: &str) -> String {
    format!("RateLimited({original})")
}

impl<C: Clock + Default> Default for ConfigRegistry<C> {
    fn default() -> Self {
        ConfigRegistry::new(C::default())
    }
}
