//! Terminal operators: drain a query into a value.
//!
//! Each call starts a fresh enumeration and stops pulling as soon as the
//! answer is known. Empty input is never an error: element-returning
//! operators give `Ok(None)`.

use futures::channel::mpsc::Sender;
use futures::executor::block_on;
use futures::SinkExt;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::iter::Sum;
use std::ops::ControlFlow;

use crate::error::{QueryError, QueryResult};
use crate::operators::materialize;
use crate::operators::ordering::compare_natural;
use crate::sequence::Query;

/// Collect every element, subject to the query's buffer limit
pub fn to_vec<T: Send + 'static>(q: &Query<T>) -> QueryResult<Vec<T>> {
    let items = materialize(q.iter(), &q.config().buffer, "to_vec")?;
    log::trace!("{}: collected {} elements", q.label(), items.len());
    Ok(items)
}

/// Index elements by `key`. A later element replaces an earlier one with the
/// same key.
pub fn to_map<T, K, F>(q: &Query<T>, key: F) -> QueryResult<HashMap<K, T>>
where
    T: Send + 'static,
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    to_map_by(q, key, |item| item)
}

/// Like [`to_map`], storing `value(element)` instead of the element
pub fn to_map_by<T, K, V, FK, FV>(q: &Query<T>, key: FK, value: FV) -> QueryResult<HashMap<K, V>>
where
    T: Send + 'static,
    K: Hash + Eq,
    FK: Fn(&T) -> K,
    FV: Fn(T) -> V,
{
    let buffer = &q.config().buffer;
    let mut map = HashMap::with_capacity(buffer.preallocate());
    for item in q.iter() {
        let item = item?;
        map.insert(key(&item), value(item));
        buffer.check("to_map", map.len())?;
    }
    Ok(map)
}

/// Send every element into `sender`, blocking while the channel is full.
///
/// Returns the number of elements sent. The sender is dropped afterwards,
/// which closes the channel once no other sender is alive.
pub fn to_channel<T: Send + 'static>(q: &Query<T>, mut sender: Sender<T>) -> QueryResult<usize> {
    let mut sent = 0;
    for item in q.iter() {
        block_on(sender.send(item?))?;
        sent += 1;
    }
    log::debug!("{}: sent {} elements to channel", q.label(), sent);
    Ok(sent)
}

pub fn count<T: Send + 'static>(q: &Query<T>) -> QueryResult<usize> {
    let mut n = 0;
    for item in q.iter() {
        item?;
        n += 1;
    }
    Ok(n)
}

/// Number of elements satisfying `predicate`
pub fn count_with<T, F>(q: &Query<T>, predicate: F) -> QueryResult<usize>
where
    T: Send + 'static,
    F: Fn(&T) -> bool,
{
    let mut n = 0;
    for item in q.iter() {
        if predicate(&item?) {
            n += 1;
        }
    }
    Ok(n)
}

/// Whether the query has at least one element; pulls at most one
pub fn any<T: Send + 'static>(q: &Query<T>) -> QueryResult<bool> {
    q.iter().next().transpose().map(|first| first.is_some())
}

pub fn any_with<T, F>(q: &Query<T>, predicate: F) -> QueryResult<bool>
where
    T: Send + 'static,
    F: Fn(&T) -> bool,
{
    Ok(first_with(q, predicate)?.is_some())
}

/// Whether every element satisfies `predicate`; `true` for an empty query
pub fn all<T, F>(q: &Query<T>, predicate: F) -> QueryResult<bool>
where
    T: Send + 'static,
    F: Fn(&T) -> bool,
{
    q.for_each_while(|item| {
        Ok(if predicate(&item) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        })
    })
}

pub fn contains<T>(q: &Query<T>, value: &T) -> QueryResult<bool>
where
    T: PartialEq + Send + 'static,
{
    any_with(q, |item| item == value)
}

pub fn first<T: Send + 'static>(q: &Query<T>) -> QueryResult<Option<T>> {
    q.iter().next().transpose()
}

/// First element satisfying `predicate`
pub fn first_with<T, F>(q: &Query<T>, predicate: F) -> QueryResult<Option<T>>
where
    T: Send + 'static,
    F: Fn(&T) -> bool,
{
    for item in q.iter() {
        let item = item?;
        if predicate(&item) {
            return Ok(Some(item));
        }
    }
    Ok(None)
}

pub fn last<T: Send + 'static>(q: &Query<T>) -> QueryResult<Option<T>> {
    last_with(q, |_| true)
}

/// Last element satisfying `predicate`; always drains the query
pub fn last_with<T, F>(q: &Query<T>, predicate: F) -> QueryResult<Option<T>>
where
    T: Send + 'static,
    F: Fn(&T) -> bool,
{
    let mut last = None;
    for item in q.iter() {
        let item = item?;
        if predicate(&item) {
            last = Some(item);
        }
    }
    Ok(last)
}

/// The only element, `Ok(None)` if there is none.
///
/// Fails with [`QueryError::MoreThanOneElement`] after pulling a second one.
pub fn single<T: Send + 'static>(q: &Query<T>) -> QueryResult<Option<T>> {
    single_with(q, |_| true)
}

pub fn single_with<T, F>(q: &Query<T>, predicate: F) -> QueryResult<Option<T>>
where
    T: Send + 'static,
    F: Fn(&T) -> bool,
{
    let mut found = None;
    for item in q.iter() {
        let item = item?;
        if predicate(&item) {
            if found.is_some() {
                return Err(QueryError::MoreThanOneElement);
            }
            found = Some(item);
        }
    }
    Ok(found)
}

/// Element at zero-based `index`
pub fn element_at<T: Send + 'static>(q: &Query<T>, index: usize) -> QueryResult<Option<T>> {
    let mut cursor = q.iter();
    for _ in 0..index {
        match cursor.next() {
            Some(item) => {
                item?;
            }
            None => return Ok(None),
        }
    }
    cursor.next().transpose()
}

/// Position of the first element equal to `value`
pub fn index_of<T>(q: &Query<T>, value: &T) -> QueryResult<Option<usize>>
where
    T: PartialEq + Send + 'static,
{
    for (index, item) in q.iter().enumerate() {
        if item? == *value {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Fold with the first element as the seed; `Ok(None)` for an empty query
pub fn aggregate<T, F>(q: &Query<T>, f: F) -> QueryResult<Option<T>>
where
    T: Send + 'static,
    F: Fn(T, T) -> T,
{
    let mut acc: Option<T> = None;
    for item in q.iter() {
        let item = item?;
        acc = Some(match acc {
            Some(acc) => f(acc, item),
            None => item,
        });
    }
    Ok(acc)
}

pub fn aggregate_with_seed<T, A, F>(q: &Query<T>, seed: A, f: F) -> QueryResult<A>
where
    T: Send + 'static,
    F: Fn(A, T) -> A,
{
    let mut acc = seed;
    for item in q.iter() {
        acc = f(acc, item?);
    }
    Ok(acc)
}

/// Fold from `seed`, then map the accumulator with `result`
pub fn aggregate_with_seed_by<T, A, R, F, S>(q: &Query<T>, seed: A, f: F, result: S) -> QueryResult<R>
where
    T: Send + 'static,
    F: Fn(A, T) -> A,
    S: FnOnce(A) -> R,
{
    aggregate_with_seed(q, seed, f).map(result)
}

pub fn sum<T>(q: &Query<T>) -> QueryResult<T>
where
    T: Sum<T> + Send + 'static,
{
    q.iter().sum()
}

/// Arithmetic mean; `Ok(None)` for an empty query.
///
/// Limited to types with a lossless `Into<f64>`. Use [`average_by`] for
/// `i64`, `u64`, `usize` and other types.
pub fn average<T>(q: &Query<T>) -> QueryResult<Option<f64>>
where
    T: Into<f64> + Send + 'static,
{
    let (mut total, mut n) = (0.0f64, 0usize);
    for item in q.iter() {
        let value: f64 = item?.into();
        total += value;
        n += 1;
    }
    Ok(if n == 0 { None } else { Some(total / n as f64) })
}

/// Arithmetic mean of `value(element)`
pub fn average_by<T, F>(q: &Query<T>, value: F) -> QueryResult<Option<f64>>
where
    T: Send + 'static,
    F: Fn(&T) -> f64,
{
    let (mut total, mut n) = (0.0f64, 0usize);
    for item in q.iter() {
        total += value(&item?);
        n += 1;
    }
    Ok(if n == 0 { None } else { Some(total / n as f64) })
}

/// Smallest element; the first of several equal minima.
///
/// Fails with [`QueryError::Incomparable`] on elements without an ordering.
pub fn min<T>(q: &Query<T>) -> QueryResult<Option<T>>
where
    T: PartialOrd + Send + 'static,
{
    best_by(q, Ordering::Less)
}

/// Largest element; the first of several equal maxima
pub fn max<T>(q: &Query<T>) -> QueryResult<Option<T>>
where
    T: PartialOrd + Send + 'static,
{
    best_by(q, Ordering::Greater)
}

/// Element with the smallest key
pub fn min_by_key<T, K, F>(q: &Query<T>, key: F) -> QueryResult<Option<T>>
where
    T: Send + 'static,
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    best_by_owned(q, key, Ordering::Less)
}

/// Element with the largest key
pub fn max_by_key<T, K, F>(q: &Query<T>, key: F) -> QueryResult<Option<T>>
where
    T: Send + 'static,
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    best_by_owned(q, key, Ordering::Greater)
}

fn best_by<T>(q: &Query<T>, wanted: Ordering) -> QueryResult<Option<T>>
where
    T: PartialOrd + Send + 'static,
{
    let mut best: Option<T> = None;
    for item in q.iter() {
        let item = item?;
        let replace = match &best {
            Some(current) => compare_natural(&item, current)? == wanted,
            None => true,
        };
        if replace {
            best = Some(item);
        }
    }
    Ok(best)
}

fn best_by_owned<T, K, F>(q: &Query<T>, key: F, wanted: Ordering) -> QueryResult<Option<T>>
where
    T: Send + 'static,
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let mut best: Option<(K, T)> = None;
    for item in q.iter() {
        let item = item?;
        let k = key(&item);
        let replace = match &best {
            Some((current, _)) => compare_natural(&k, current)? == wanted,
            None => true,
        };
        if replace {
            best = Some((k, item));
        }
    }
    Ok(best.map(|(_, item)| item))
}

pub fn for_each<T, F>(q: &Query<T>, mut f: F) -> QueryResult<()>
where
    T: Send + 'static,
    F: FnMut(T),
{
    for item in q.iter() {
        f(item?);
    }
    Ok(())
}

pub fn for_each_indexed<T, F>(q: &Query<T>, mut f: F) -> QueryResult<()>
where
    T: Send + 'static,
    F: FnMut(usize, T),
{
    for (index, item) in q.iter().enumerate() {
        f(index, item?);
    }
    Ok(())
}

/// Whether both queries yield equal elements in the same order.
///
/// Stops at the first difference.
pub fn sequence_equal<T>(first: &Query<T>, second: &Query<T>) -> QueryResult<bool>
where
    T: PartialEq + Send + 'static,
{
    let mut left = first.iter();
    let mut right = second.iter();
    loop {
        match (left.next().transpose()?, right.next().transpose()?) {
            (Some(a), Some(b)) if a == b => continue,
            (None, None) => return Ok(true),
            _ => return Ok(false),
        }
    }
}
