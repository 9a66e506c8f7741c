//! Bounded caches shared by all validation runs of a validator.
use crate::{
    ecma::{self, PatternError},
    primitive_type::PrimitiveType,
    tree::SchemaLocation,
};
use ahash::AHashMap;
use parking_lot::Mutex;
use std::{borrow::Borrow, collections::VecDeque, hash::Hash, sync::Arc};

/// Slots allocated up front by every cache.
pub(crate) const INITIAL_CAPACITY: usize = 10;
/// Entries kept before the least recently used one is evicted.
pub(crate) const MAX_CAPACITY: usize = 50;

/// Least-recently-used map. Lookups move the entry to the back of the queue.
pub(crate) struct LruCache<K, V> {
    map: AHashMap<K, V>,
    queue: VecDeque<K>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    pub(crate) fn new(initial: usize, capacity: usize) -> Self {
        LruCache {
            map: AHashMap::with_capacity(initial),
            queue: VecDeque::with_capacity(initial),
            capacity,
        }
    }

    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.map.get(key)?;
        if let Some(index) = self.queue.iter().position(|x| x.borrow() == key) {
            if let Some(k) = self.queue.remove(index) {
                self.queue.push_back(k);
            }
        }
        Some(value)
    }

    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.map.len() >= self.capacity && !self.map.contains_key(&key) {
            if let Some(lru_key) = self.queue.pop_front() {
                self.map.remove(&lru_key);
            }
        }
        let old_value = self.map.insert(key.clone(), value);
        if old_value.is_some() {
            if let Some(index) = self.queue.iter().position(|x| x == &key) {
                self.queue.remove(index);
            }
        }
        self.queue.push_back(key);
        old_value
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

/// Compiled keyword validators per schema location, one LRU per instance type.
///
/// Disabling the cache rebuilds the validators on every lookup; results are identical.
pub(crate) struct ValidatorCache<V> {
    enabled: bool,
    shards: Vec<Mutex<LruCache<SchemaLocation, Arc<V>>>>,
}

impl<V> ValidatorCache<V> {
    pub(crate) fn new(enabled: bool) -> Self {
        let shards = PrimitiveType::ALL
            .iter()
            .map(|_| Mutex::new(LruCache::new(INITIAL_CAPACITY, MAX_CAPACITY)))
            .collect();
        ValidatorCache { enabled, shards }
    }

    /// The cached entry for `(location, instance_type)`, building it on a miss.
    ///
    /// The lock is released while building; if two threads race, the last insert wins and
    /// both get an equivalent value.
    pub(crate) fn get_or_build(
        &self,
        location: &SchemaLocation,
        instance_type: PrimitiveType,
        build: impl FnOnce() -> V,
    ) -> Arc<V> {
        if !self.enabled {
            return Arc::new(build());
        }
        let shard = &self.shards[instance_type.index()];
        if let Some(cached) = shard.lock().get(location) {
            return Arc::clone(cached);
        }
        tracing::debug!(
            location = %location,
            instance_type = %instance_type,
            "validator cache miss"
        );
        let built = Arc::new(build());
        shard.lock().insert(location.clone(), Arc::clone(&built));
        built
    }

    #[cfg(test)]
    pub(crate) fn len(&self, instance_type: PrimitiveType) -> usize {
        self.shards[instance_type.index()].lock().len()
    }
}

/// Compiled ECMA 262 patterns by source text.
pub(crate) struct RegexCache {
    inner: Mutex<LruCache<String, fancy_regex::Regex>>,
}

impl Default for RegexCache {
    fn default() -> Self {
        RegexCache {
            inner: Mutex::new(LruCache::new(INITIAL_CAPACITY, MAX_CAPACITY)),
        }
    }
}

impl RegexCache {
    pub(crate) fn get_or_compile(&self, pattern: &str) -> Result<fancy_regex::Regex, PatternError> {
        if let Some(regex) = self.inner.lock().get(pattern) {
            return Ok(regex.clone());
        }
        let regex = ecma::compile(pattern)?;
        self.inner
            .lock()
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}
