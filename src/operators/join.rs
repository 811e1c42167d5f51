//! Join, GroupJoin, LeftJoin and the predicate-based JoinOn / GroupJoinOn.
//!
//! Key-based joins build a correlation table (inner key to inner elements)
//! once, on the first pull of an enumeration, then stream the outer input:
//! outer order is preserved and, within one outer element, inner order is
//! preserved. The table lives as long as the cursor.
//!
//! The predicate-based joins cannot hash anything, so they keep the inner
//! input materialized and test every (outer, inner) pair: O(n·m) predicate
//! calls per enumeration.

use std::collections::HashMap;
use std::hash::Hash;
use std::iter;
use std::sync::Arc;

use crate::error::QueryResult;
use crate::operators::materialize;
use crate::query_configuration::BufferConfig;
use crate::sequence::{Cursor, Query};

type KeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;
type PairFn<O, I, R> = Arc<dyn Fn(&O, &I) -> R + Send + Sync>;
type LeftFn<O, R> = Arc<dyn Fn(&O) -> R + Send + Sync>;

/// Build the inner lookup table, preserving inner order per key.
fn correlate<I, K>(
    inner: Cursor<I>,
    key: &(dyn Fn(&I) -> K + Send + Sync),
    buffer: &BufferConfig,
    operator: &'static str,
    label: &str,
) -> QueryResult<HashMap<K, Vec<I>>>
where
    K: Hash + Eq,
{
    let mut table: HashMap<K, Vec<I>> = HashMap::with_capacity(buffer.preallocate());
    let mut buffered = 0;
    for item in inner {
        let item = item?;
        table.entry(key(&item)).or_default().push(item);
        buffered += 1;
        buffer.check(operator, buffered)?;
    }
    log::debug!(
        "{}: {} correlation table holds {} elements under {} keys",
        label,
        operator,
        buffered,
        table.len()
    );
    Ok(table)
}

/// Cursor shared by `join` and `left_join`.
struct HashJoin<O, I, K, R> {
    outer: Cursor<O>,
    inner: Option<Query<I>>,
    table: HashMap<K, Vec<I>>,
    /// Outer element being expanded, its key and the next match position
    current: Option<(O, K, usize)>,
    outer_key: KeyFn<O, K>,
    inner_key: KeyFn<I, K>,
    result: PairFn<O, I, R>,
    left_only: Option<LeftFn<O, R>>,
    buffer: BufferConfig,
    operator: &'static str,
    label: String,
}

impl<O, I, K, R> Iterator for HashJoin<O, I, K, R>
where
    I: Send + 'static,
    K: Hash + Eq,
{
    type Item = QueryResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(inner) = self.inner.take() {
            match correlate(
                inner.iter(),
                &*self.inner_key,
                &self.buffer,
                self.operator,
                &self.label,
            ) {
                Ok(table) => self.table = table,
                Err(err) => return Some(Err(err)),
            }
        }

        loop {
            if let Some((outer, key, position)) = self.current.as_mut() {
                if let Some(matched) = self.table.get(&*key).and_then(|m| m.get(*position)) {
                    *position += 1;
                    return Some(Ok((self.result)(&*outer, matched)));
                }
                self.current = None;
            }

            let outer = match self.outer.next()? {
                Ok(outer) => outer,
                Err(err) => return Some(Err(err)),
            };
            let key = (self.outer_key)(&outer);
            if self.table.contains_key(&key) {
                self.current = Some((outer, key, 0));
            } else if let Some(left_only) = &self.left_only {
                return Some(Ok(left_only(&outer)));
            }
        }
    }
}

fn hash_join<O, I, K, R>(
    outer: Query<O>,
    inner: Query<I>,
    outer_key: KeyFn<O, K>,
    inner_key: KeyFn<I, K>,
    result: PairFn<O, I, R>,
    left_only: Option<LeftFn<O, R>>,
    operator: &'static str,
) -> Query<R>
where
    O: Send + 'static,
    I: Send + 'static,
    K: Hash + Eq + Send + 'static,
    R: Send + 'static,
{
    outer.chain(move |outer| {
        Box::new(HashJoin {
            outer: outer.iter(),
            inner: Some(inner.clone()),
            table: HashMap::new(),
            current: None,
            outer_key: Arc::clone(&outer_key),
            inner_key: Arc::clone(&inner_key),
            result: Arc::clone(&result),
            left_only: left_only.clone(),
            buffer: outer.config().buffer.clone(),
            operator,
            label: outer.label().to_string(),
        })
    })
}

/// Inner join on equal keys: one result per matching (outer, inner) pair.
/// Outer elements without a match produce nothing.
pub fn join<O, I, K, R, FO, FI, FR>(
    outer: Query<O>,
    inner: Query<I>,
    outer_key: FO,
    inner_key: FI,
    result: FR,
) -> Query<R>
where
    O: Send + 'static,
    I: Send + 'static,
    K: Hash + Eq + Send + 'static,
    R: Send + 'static,
    FO: Fn(&O) -> K + Send + Sync + 'static,
    FI: Fn(&I) -> K + Send + Sync + 'static,
    FR: Fn(&O, &I) -> R + Send + Sync + 'static,
{
    hash_join(
        outer,
        inner,
        Arc::new(outer_key),
        Arc::new(inner_key),
        Arc::new(result),
        None,
        "join",
    )
}

/// Like [`join`], but an outer element without matches still produces one
/// result, built by `left_only`
pub fn left_join<O, I, K, R, FO, FI, FR, FL>(
    outer: Query<O>,
    inner: Query<I>,
    outer_key: FO,
    inner_key: FI,
    result: FR,
    left_only: FL,
) -> Query<R>
where
    O: Send + 'static,
    I: Send + 'static,
    K: Hash + Eq + Send + 'static,
    R: Send + 'static,
    FO: Fn(&O) -> K + Send + Sync + 'static,
    FI: Fn(&I) -> K + Send + Sync + 'static,
    FR: Fn(&O, &I) -> R + Send + Sync + 'static,
    FL: Fn(&O) -> R + Send + Sync + 'static,
{
    hash_join(
        outer,
        inner,
        Arc::new(outer_key),
        Arc::new(inner_key),
        Arc::new(result),
        Some(Arc::new(left_only)),
        "left_join",
    )
}

/// Exactly one result per outer element, paired with all inner elements
/// sharing its key (possibly none)
pub fn group_join<O, I, K, R, FO, FI, FR>(
    outer: Query<O>,
    inner: Query<I>,
    outer_key: FO,
    inner_key: FI,
    result: FR,
) -> Query<R>
where
    O: Send + 'static,
    I: Clone + Send + 'static,
    K: Hash + Eq + Send + 'static,
    R: Send + 'static,
    FO: Fn(&O) -> K + Send + Sync + 'static,
    FI: Fn(&I) -> K + Send + Sync + 'static,
    FR: Fn(O, Vec<I>) -> R + Send + Sync + 'static,
{
    let outer_key = Arc::new(outer_key);
    let inner_key: KeyFn<I, K> = Arc::new(inner_key);
    let result = Arc::new(result);
    outer.chain(move |outer| {
        let outer_key = Arc::clone(&outer_key);
        let inner_key = Arc::clone(&inner_key);
        let result = Arc::clone(&result);
        let mut cursor = outer.iter();
        let mut inner = Some(inner.clone());
        let mut table: HashMap<K, Vec<I>> = HashMap::new();
        let buffer = outer.config().buffer.clone();
        let label = outer.label().to_string();
        Box::new(iter::from_fn(move || {
            if let Some(inner) = inner.take() {
                match correlate(inner.iter(), &*inner_key, &buffer, "group_join", &label) {
                    Ok(built) => table = built,
                    Err(err) => return Some(Err(err)),
                }
            }
            match cursor.next()? {
                Ok(item) => {
                    let matches = table.get(&outer_key(&item)).cloned().unwrap_or_default();
                    Some(Ok(result(item, matches)))
                }
                Err(err) => Some(Err(err)),
            }
        }))
    })
}

/// Inner join on an arbitrary predicate; tests every (outer, inner) pair
pub fn join_on<O, I, R, P, FR>(outer: Query<O>, inner: Query<I>, predicate: P, result: FR) -> Query<R>
where
    O: Send + 'static,
    I: Send + 'static,
    R: Send + 'static,
    P: Fn(&O, &I) -> bool + Send + Sync + 'static,
    FR: Fn(&O, &I) -> R + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    let result = Arc::new(result);
    outer.chain(move |outer| {
        let predicate = Arc::clone(&predicate);
        let result = Arc::clone(&result);
        let mut cursor = outer.iter();
        let mut inner = Some(inner.clone());
        let mut rows: Vec<I> = Vec::new();
        let mut current: Option<(O, usize)> = None;
        let buffer = outer.config().buffer.clone();
        Box::new(iter::from_fn(move || {
            if let Some(inner) = inner.take() {
                match materialize(inner.iter(), &buffer, "join_on") {
                    Ok(items) => rows = items,
                    Err(err) => return Some(Err(err)),
                }
            }
            loop {
                if let Some((item, position)) = current.as_mut() {
                    while *position < rows.len() {
                        let candidate = &rows[*position];
                        *position += 1;
                        if predicate(&*item, candidate) {
                            return Some(Ok(result(&*item, candidate)));
                        }
                    }
                    current = None;
                }
                match cursor.next()? {
                    Ok(item) => current = Some((item, 0)),
                    Err(err) => return Some(Err(err)),
                }
            }
        }))
    })
}

/// One result per outer element, paired with every inner element the
/// predicate accepts; tests every (outer, inner) pair
pub fn group_join_on<O, I, R, P, FR>(
    outer: Query<O>,
    inner: Query<I>,
    predicate: P,
    result: FR,
) -> Query<R>
where
    O: Send + 'static,
    I: Clone + Send + 'static,
    R: Send + 'static,
    P: Fn(&O, &I) -> bool + Send + Sync + 'static,
    FR: Fn(O, Vec<I>) -> R + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    let result = Arc::new(result);
    outer.chain(move |outer| {
        let predicate = Arc::clone(&predicate);
        let result = Arc::clone(&result);
        let mut cursor = outer.iter();
        let mut inner = Some(inner.clone());
        let mut rows: Vec<I> = Vec::new();
        let buffer = outer.config().buffer.clone();
        Box::new(iter::from_fn(move || {
            if let Some(inner) = inner.take() {
                match materialize(inner.iter(), &buffer, "group_join_on") {
                    Ok(items) => rows = items,
                    Err(err) => return Some(Err(err)),
                }
            }
            match cursor.next()? {
                Ok(item) => {
                    let matches = rows
                        .iter()
                        .filter(|candidate| predicate(&item, *candidate))
                        .cloned()
                        .collect();
                    Some(Ok(result(item, matches)))
                }
                Err(err) => Some(Err(err)),
            }
        }))
    })
}
