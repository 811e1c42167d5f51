//! Hash-based set operations: distinct, union, intersect, except and their
//! keyed `_by` variants.
//!
//! Every operator here streams its first input in order, so output follows
//! first-occurrence order. Intersect and except read their second input
//! completely on the first pull to build the membership set.

use std::collections::HashSet;
use std::hash::Hash;
use std::iter;
use std::sync::Arc;

use crate::error::QueryResult;
use crate::query_configuration::BufferConfig;
use crate::sequence::{Cursor, Query};

/// Seen-key set bounded by the query's buffer limit.
struct SeenKeys<K> {
    keys: HashSet<K>,
    buffer: BufferConfig,
    operator: &'static str,
}

impl<K: Hash + Eq> SeenKeys<K> {
    fn new(buffer: BufferConfig, operator: &'static str) -> Self {
        SeenKeys {
            keys: HashSet::with_capacity(buffer.preallocate()),
            buffer,
            operator,
        }
    }

    /// Records `key`; returns whether it was new.
    fn insert(&mut self, key: K) -> QueryResult<bool> {
        let fresh = self.keys.insert(key);
        if fresh {
            self.buffer.check(self.operator, self.keys.len())?;
        }
        Ok(fresh)
    }

    /// Drain a cursor into the set, keyed by `key`.
    fn load<T, F>(&mut self, cursor: Cursor<T>, key: &F) -> QueryResult<()>
    where
        F: Fn(&T) -> K,
    {
        for item in cursor {
            self.insert(key(&item?))?;
        }
        Ok(())
    }
}

/// Drop repeated elements, keeping the first occurrence
pub fn distinct<T>(q: Query<T>) -> Query<T>
where
    T: Hash + Eq + Clone + Send + 'static,
{
    distinct_by(q, T::clone)
}

/// Drop elements whose key has already been seen
pub fn distinct_by<T, K, F>(q: Query<T>, key: F) -> Query<T>
where
    T: Send + 'static,
    K: Hash + Eq + Send + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    let key = Arc::new(key);
    q.chain(move |input| {
        let key = Arc::clone(&key);
        let mut cursor = input.iter();
        let mut seen = SeenKeys::new(input.config().buffer.clone(), "distinct");
        Box::new(iter::from_fn(move || loop {
            match cursor.next()? {
                Ok(item) => match seen.insert(key(&item)) {
                    Ok(true) => return Some(Ok(item)),
                    Ok(false) => continue,
                    Err(err) => return Some(Err(err)),
                },
                Err(err) => return Some(Err(err)),
            }
        }))
    })
}

/// Drop repeats by comparing each element with the previous one only.
///
/// Constant space, but only correct when equal elements are adjacent in the
/// input, e.g. after ordering by the element itself. On unsorted input,
/// non-adjacent repeats are kept.
pub fn distinct_sorted<T>(q: Query<T>) -> Query<T>
where
    T: PartialEq + Clone + Send + 'static,
{
    distinct_sorted_by(q, T::clone)
}

/// Keyed [`distinct_sorted`]; equal keys must be adjacent.
pub fn distinct_sorted_by<T, K, F>(q: Query<T>, key: F) -> Query<T>
where
    T: Send + 'static,
    K: PartialEq + Send + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    let key = Arc::new(key);
    q.chain(move |input| {
        let key = Arc::clone(&key);
        let mut cursor = input.iter();
        let mut previous: Option<K> = None;
        Box::new(iter::from_fn(move || loop {
            match cursor.next()? {
                Ok(item) => {
                    let current = key(&item);
                    if previous.as_ref() != Some(&current) {
                        previous = Some(current);
                        return Some(Ok(item));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }))
    })
}

/// Distinct elements of `first`, then distinct elements of `second` not
/// already yielded
pub fn union<T>(first: Query<T>, second: Query<T>) -> Query<T>
where
    T: Hash + Eq + Clone + Send + 'static,
{
    union_by(first, second, T::clone)
}

/// Keyed [`union`]; one seen-set spans both inputs
pub fn union_by<T, K, F>(first: Query<T>, second: Query<T>, key: F) -> Query<T>
where
    T: Send + 'static,
    K: Hash + Eq + Send + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    let key = Arc::new(key);
    first.chain(move |first| {
        let key = Arc::clone(&key);
        let second = second.clone();
        let mut head = Some(first.iter());
        let mut tail: Option<Cursor<T>> = None;
        let mut seen = SeenKeys::new(first.config().buffer.clone(), "union");
        Box::new(iter::from_fn(move || loop {
            let next = match head.as_mut() {
                Some(cursor) => match cursor.next() {
                    Some(item) => item,
                    None => {
                        head = None;
                        continue;
                    }
                },
                None => tail.get_or_insert_with(|| second.iter()).next()?,
            };
            match next {
                Ok(item) => match seen.insert(key(&item)) {
                    Ok(true) => return Some(Ok(item)),
                    Ok(false) => continue,
                    Err(err) => return Some(Err(err)),
                },
                Err(err) => return Some(Err(err)),
            }
        }))
    })
}

/// Elements of `first` that also occur in `second`, each at most once
pub fn intersect<T>(first: Query<T>, second: Query<T>) -> Query<T>
where
    T: Hash + Eq + Clone + Send + 'static,
{
    intersect_by(first, second, T::clone)
}

/// Keyed [`intersect`]. A key is removed from the set when it first matches,
/// so later elements of `first` with the same key are dropped.
pub fn intersect_by<T, K, F>(first: Query<T>, second: Query<T>, key: F) -> Query<T>
where
    T: Send + 'static,
    K: Hash + Eq + Send + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    let key = Arc::new(key);
    first.chain(move |first| {
        let key = Arc::clone(&key);
        let second = second.clone();
        let mut cursor = first.iter();
        let buffer = first.config().buffer.clone();
        let mut wanted: Option<HashSet<K>> = None;
        Box::new(iter::from_fn(move || {
            if wanted.is_none() {
                let mut seen = SeenKeys::new(buffer.clone(), "intersect");
                if let Err(err) = seen.load(second.iter(), &*key) {
                    return Some(Err(err));
                }
                wanted = Some(seen.keys);
            }
            let wanted = wanted.as_mut()?;
            while !wanted.is_empty() {
                match cursor.next()? {
                    Ok(item) => {
                        if wanted.remove(&key(&item)) {
                            return Some(Ok(item));
                        }
                    }
                    Err(err) => return Some(Err(err)),
                }
            }
            None
        }))
    })
}

/// Elements of `first` that do not occur in `second`, as many times as they
/// occur in `first`
pub fn except<T>(first: Query<T>, second: Query<T>) -> Query<T>
where
    T: Hash + Eq + Clone + Send + 'static,
{
    except_by(first, second, T::clone)
}

/// Keyed [`except`]
pub fn except_by<T, K, F>(first: Query<T>, second: Query<T>, key: F) -> Query<T>
where
    T: Send + 'static,
    K: Hash + Eq + Send + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    let key = Arc::new(key);
    first.chain(move |first| {
        let key = Arc::clone(&key);
        let second = second.clone();
        let mut cursor = first.iter();
        let buffer = first.config().buffer.clone();
        let mut excluded: Option<HashSet<K>> = None;
        Box::new(iter::from_fn(move || {
            if excluded.is_none() {
                let mut seen = SeenKeys::new(buffer.clone(), "except");
                if let Err(err) = seen.load(second.iter(), &*key) {
                    return Some(Err(err));
                }
                excluded = Some(seen.keys);
            }
            let excluded = excluded.as_ref()?;
            loop {
                match cursor.next()? {
                    Ok(item) => {
                        if !excluded.contains(&key(&item)) {
                            return Some(Ok(item));
                        }
                    }
                    Err(err) => return Some(Err(err)),
                }
            }
        }))
    })
}
