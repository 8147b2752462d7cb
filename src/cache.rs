// src/cache.rs
//! Memoizing function caches
//!
//! # Contract
//!
//! A cache wraps a pure single-argument function `f: &K -> V` and stores every
//! result it computes, keyed by argument. For as long as a function stays
//! bound, `f` runs at most once per distinct key:
//! ```text
//! invoke(k) = store[k]                    if k was seen
//!           = store[k] <- f(k); store[k]  otherwise
//! ```
//! Rebinding the function with `set_function` empties the store, since the
//! entries computed by the previous function no longer describe the new one.
//!
//! # Variants
//!
//! - [`Cache`]: single-threaded. `invoke` takes `&self` and fills the store
//!   through a `RefCell`, so a logically read-only owner can still memoize.
//!   It is `!Sync`; sharing one across threads is rejected at compile time.
//! - [`SyncCache`]: shareable between threads. A miss goes through the
//!   `DashMap` entry API, which holds the shard lock while `f` runs, so two
//!   threads racing on the same key still evaluate `f` once.
//!
//! There is no eviction. Keys used by the lattices are step times, bounded
//! by the step count.

use crate::error::{validation::validate_finite, LatticeError, LatticeResult};
use dashmap::DashMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

type BoxedFn<K, V> = Box<dyn Fn(&K) -> V>;
type SharedFn<K, V> = Box<dyn Fn(&K) -> V + Send + Sync>;

fn unbound() -> LatticeError {
    LatticeError::InvalidConfiguration {
        field: "function".to_string(),
        reason: "no function bound; call set_function before invoke".to_string(),
    }
}

/// Single-threaded memoizing adapter.
pub struct Cache<K, V> {
    function: Option<BoxedFn<K, V>>,
    store: RefCell<HashMap<K, V>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Unbound cache; `invoke` fails until a function is set.
    pub fn new() -> Self {
        Cache {
            function: None,
            store: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_function<F>(f: F) -> Self
    where
        F: Fn(&K) -> V + 'static,
    {
        let mut cache = Self::new();
        cache.set_function(f);
        cache
    }

    /// Bind (or rebind) the memoized function. Clears previously stored results.
    pub fn set_function<F>(&mut self, f: F)
    where
        F: Fn(&K) -> V + 'static,
    {
        self.function = Some(Box::new(f));
        self.store.get_mut().clear();
    }

    pub fn is_bound(&self) -> bool {
        self.function.is_some()
    }

    pub fn invoke(&self, key: &K) -> LatticeResult<V> {
        if let Some(value) = self.store.borrow().get(key).cloned() {
            return Ok(value);
        }
        let f = self.function.as_ref().ok_or_else(unbound)?;
        // The borrow is released while `f` runs.
        let value = f(key);
        tracing::trace!("cache miss; storing entry {}", self.store.borrow().len() + 1);
        self.store.borrow_mut().insert(key.clone(), value.clone());
        Ok(value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.store.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }

    pub fn clear(&mut self) {
        self.store.get_mut().clear();
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe memoizing adapter with atomic get-or-compute per key.
pub struct SyncCache<K, V>
where
    K: Eq + Hash,
{
    function: Option<SharedFn<K, V>>,
    store: DashMap<K, V>,
}

impl<K, V> SyncCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        SyncCache {
            function: None,
            store: DashMap::new(),
        }
    }

    pub fn with_function<F>(f: F) -> Self
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        let mut cache = Self::new();
        cache.set_function(f);
        cache
    }

    /// Bind (or rebind) the memoized function. Clears previously stored results.
    pub fn set_function<F>(&mut self, f: F)
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        self.function = Some(Box::new(f));
        self.store.clear();
    }

    pub fn is_bound(&self) -> bool {
        self.function.is_some()
    }

    pub fn invoke(&self, key: &K) -> LatticeResult<V> {
        if let Some(value) = self.store.get(key).map(|hit| hit.value().clone()) {
            return Ok(value);
        }
        let f = self.function.as_ref().ok_or_else(unbound)?;
        // The entry keeps its shard locked until the value is in place.
        let entry = self.store.entry(key.clone()).or_insert_with(|| {
            tracing::trace!("sync cache miss");
            f(key)
        });
        Ok(entry.value().clone())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn clear(&self) {
        self.store.clear();
    }
}

impl<K, V> Default for SyncCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Elapsed time usable as a hash/ordered key.
///
/// Keys compare by bit pattern after folding `-0.0` onto `0.0`. Step times
/// are produced as `i * dt`, so equal steps give identical bits.
#[derive(Clone, Copy, Debug)]
pub struct TimeKey(f64);

impl TimeKey {
    pub fn new(t: f64) -> LatticeResult<Self> {
        validate_finite("t", t)?;
        Ok(TimeKey(if t == 0.0 { 0.0 } else { t }))
    }

    pub fn time(&self) -> f64 {
        self.0
    }
}

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for TimeKey {}

impl Hash for TimeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
