//! Rounded-coordinate buckets.

use super::{IndexError, IndexResult};
use std::collections::HashMap;

/// Round a coordinate to its bucket key.
///
/// `f64::round` rounds half away from zero, so `2.5 -> 3` and `-2.5 -> -3`.
/// Every insert, remove and lookup goes through here.
pub fn bucket_key(coordinate: f64) -> i64 {
    coordinate.round() as i64
}

/// Maps a rounded coordinate to the ordered, non-empty list of entries at it.
#[derive(Debug, Clone)]
pub struct BucketIndex<T> {
    buckets: HashMap<i64, Vec<T>>,
}

impl<T> Default for BucketIndex<T> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }
}

impl<T: Copy + PartialEq> BucketIndex<T> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to the bucket at `coordinate`, creating the bucket if needed.
    pub fn insert(&mut self, entry: T, coordinate: f64) {
        self.buckets
            .entry(bucket_key(coordinate))
            .or_default()
            .push(entry);
    }

    /// Remove `entry` from the bucket at `coordinate`.
    ///
    /// The bucket is dropped as soon as it becomes empty. A missing bucket or
    /// entry means the caller's recorded coordinate no longer matches where
    /// the entry was indexed.
    pub fn remove(&mut self, entry: T, coordinate: f64) -> IndexResult<()> {
        let key = bucket_key(coordinate);
        let bucket = self
            .buckets
            .get_mut(&key)
            .ok_or(IndexError::MissingBucket { key })?;
        let pos = bucket
            .iter()
            .position(|e| *e == entry)
            .ok_or(IndexError::MissingEntry { key })?;
        bucket.remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        Ok(())
    }

    /// Entries at `coordinate`, or `None`. Never returns an empty slice.
    pub fn lookup(&self, coordinate: f64) -> Option<&[T]> {
        self.buckets
            .get(&bucket_key(coordinate))
            .map(|bucket| bucket.as_slice())
    }

    /// Whether `entry` is stored at `coordinate`.
    pub fn contains(&self, entry: T, coordinate: f64) -> bool {
        self.lookup(coordinate)
            .is_some_and(|bucket| bucket.contains(&entry))
    }

    /// Whether `entry` is stored in any bucket.
    pub fn contains_anywhere(&self, entry: T) -> bool {
        self.buckets.values().any(|bucket| bucket.contains(&entry))
    }

    /// Number of occupied keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterate over `(key, bucket)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &[T])> {
        self.buckets.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}
