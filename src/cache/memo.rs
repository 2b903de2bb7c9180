use crate::error::ConfigError;
use crate::hyperparams::Fingerprint;
use serde::Serialize;
use std::collections::HashMap;

/// Memo key: function identity plus a fingerprint of its arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub function: &'static str,
    pub arguments: Fingerprint,
}

impl MemoKey {
    pub fn new<A: Serialize + ?Sized>(function: &'static str, arguments: &A) -> Result<Self, ConfigError> {
        Ok(Self {
            function,
            arguments: Fingerprint::of(arguments)?,
        })
    }
}

/// Explicit keyed memoization with controllable invalidation
#[derive(Debug)]
pub struct Memo<V> {
    entries: HashMap<MemoKey, V>,
    hits: u64,
    misses: u64,
}

impl<V> Default for Memo<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V: Clone> Memo<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MemoKey) -> Option<&V> {
        self.entries.get(key)
    }

    /// Return the memoized value, computing and storing it on a miss.
    ///
    /// Errors are returned as-is and nothing is stored.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: MemoKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(value.clone());
        }

        self.misses += 1;
        let value = compute()?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    /// Drop one entry; returns whether it existed
    pub fn invalidate(&mut self, key: &MemoKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry memoized for `function`; returns how many
    pub fn invalidate_function(&mut self, function: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.function != function);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
