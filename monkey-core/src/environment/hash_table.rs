use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use thiserror::Error;

use super::prelude::{Value, ValueType};

/// Bucket address of a map key. The concrete type takes part in the key,
/// so `0` and `false` never land in the same bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub value_type: ValueType,
    pub hash: u64,
}

pub trait Hashable {
    fn hash_key(&self) -> HashKey;
}

fn fx_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);

    hasher.finish()
}

impl Hashable for i64 {
    fn hash_key(&self) -> HashKey {
        HashKey { value_type: ValueType::Integer, hash: fx_hash(self) }
    }
}

impl Hashable for bool {
    fn hash_key(&self) -> HashKey {
        HashKey { value_type: ValueType::Boolean, hash: fx_hash(self) }
    }
}

impl Hashable for str {
    fn hash_key(&self) -> HashKey {
        HashKey { value_type: ValueType::String, hash: fx_hash(self) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a value of type {0} cannot be used as a map key")]
pub struct NotHashable(pub ValueType);

/// Map storage. Keys sharing a [`HashKey`] live in one bucket, which is
/// searched by value equality.
#[derive(Debug, Clone, Default)]
pub struct HashTable {
    buckets: FxHashMap<HashKey, Vec<(Value, Value)>>,
    len: usize,
}

impl HashTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_of(key: &Value) -> Result<HashKey, NotHashable> {
        key.hash_key().ok_or(NotHashable(key.value_type()))
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<Option<Value>, NotHashable> {
        let bucket = self.buckets.entry(Self::key_of(&key)?).or_default();

        if let Some((_, slot)) = bucket.iter_mut().find(|(existing, _)| *existing == key) {
            return Ok(Some(std::mem::replace(slot, value)));
        }

        bucket.push((key, value));
        self.len += 1;

        Ok(None)
    }

    pub fn get(&self, key: &Value) -> Result<Option<&Value>, NotHashable> {
        let found = self.buckets.get(&Self::key_of(key)?)
            .and_then(|bucket| bucket.iter().find(|(existing, _)| existing == key))
            .map(|(_, value)| value);

        Ok(found)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pairs in bucket order, which is unrelated to insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.buckets.values()
            .flatten()
            .map(|(key, value)| (key, value))
    }
}

impl PartialEq for HashTable {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(key, value)| {
            matches!(other.get(key), Ok(Some(found)) if found == value)
        })
    }
}
