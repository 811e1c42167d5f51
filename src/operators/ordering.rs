//! Ordering engine: OrderBy / ThenBy chains and Sort.
//!
//! An ordering is an immutable linked list of sort keys; `then_by` adds a link
//! in front of an existing list without touching it, so one ordered query can
//! branch into several independent refinements.
//!
//! Sorting is deferred to the first pull. The input is materialized, each key
//! is computed once per element, and a stable merge sort runs over element
//! positions. Key comparison is fallible: natural keys use `PartialOrd` and a
//! pair of keys without an ordering (e.g. `NaN`) aborts the enumeration with
//! [`QueryError::Incomparable`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{QueryError, QueryResult};
use crate::operators::{deferred, materialize};
use crate::query_ext::QueryExt;
use crate::sequence::{Cursor, Query, Sequence};

/// Sort direction of one ordering key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// Natural comparison; keys without an ordering between them are an error.
pub(crate) fn compare_natural<K: PartialOrd>(a: &K, b: &K) -> QueryResult<Ordering> {
    a.partial_cmp(b).ok_or_else(QueryError::incomparable::<K>)
}

/// Keys of one ordering level, computed once per buffered element.
trait KeyColumn {
    fn compare(&self, a: usize, b: usize) -> QueryResult<Ordering>;
}

struct Column<'a, K, C> {
    keys: Vec<K>,
    compare: &'a C,
}

impl<K, C> KeyColumn for Column<'_, K, C>
where
    C: Fn(&K, &K) -> QueryResult<Ordering>,
{
    fn compare(&self, a: usize, b: usize) -> QueryResult<Ordering> {
        (self.compare)(&self.keys[a], &self.keys[b])
    }
}

/// One level of an ordering, with its key type erased.
trait SortKey<T>: Send + Sync {
    fn column<'a>(&'a self, items: &[T]) -> Box<dyn KeyColumn + 'a>;
    fn direction(&self) -> Direction;
}

struct KeySelector<T, K, F, C> {
    select: F,
    compare: C,
    direction: Direction,
    _marker: PhantomData<fn(&T) -> K>,
}

impl<T, K, F, C> SortKey<T> for KeySelector<T, K, F, C>
where
    K: 'static,
    F: Fn(&T) -> K + Send + Sync,
    C: Fn(&K, &K) -> QueryResult<Ordering> + Send + Sync,
{
    fn column<'a>(&'a self, items: &[T]) -> Box<dyn KeyColumn + 'a> {
        Box::new(Column {
            keys: items.iter().map(&self.select).collect(),
            compare: &self.compare,
        })
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// Link of the persistent ordering list; `parent` holds the more
/// significant keys.
struct OrderingLink<T> {
    key: Arc<dyn SortKey<T>>,
    parent: Option<Arc<OrderingLink<T>>>,
}

impl<T> OrderingLink<T> {
    /// Keys, most significant first.
    fn keys(&self) -> Vec<Arc<dyn SortKey<T>>> {
        let mut keys = vec![Arc::clone(&self.key)];
        let mut link = self.parent.as_deref();
        while let Some(current) = link {
            keys.push(Arc::clone(&current.key));
            link = current.parent.as_deref();
        }
        keys.reverse();
        keys
    }
}

/// A query with an ordering that can be refined with `then_by*`.
///
/// Enumerating it yields the sorted elements.
pub struct OrderedQuery<T> {
    source: Query<T>,
    ordering: Arc<OrderingLink<T>>,
    sorted: Query<T>,
}

impl<T> Clone for OrderedQuery<T> {
    fn clone(&self) -> Self {
        OrderedQuery {
            source: self.source.clone(),
            ordering: Arc::clone(&self.ordering),
            sorted: self.sorted.clone(),
        }
    }
}

impl<T: Send + 'static> OrderedQuery<T> {
    fn new(source: Query<T>, ordering: Arc<OrderingLink<T>>) -> Self {
        let sorted = sorted_by_keys(source.clone(), Arc::clone(&ordering));
        OrderedQuery {
            source,
            ordering,
            sorted,
        }
    }

    fn refine(&self, key: Arc<dyn SortKey<T>>) -> Self {
        let link = OrderingLink {
            key,
            parent: Some(Arc::clone(&self.ordering)),
        };
        OrderedQuery::new(self.source.clone(), Arc::new(link))
    }

    /// Break ties of the current ordering by `key`, ascending
    pub fn then_by<K, F>(&self, key: F) -> OrderedQuery<T>
    where
        K: PartialOrd + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.refine(natural_key(key, Direction::Ascending))
    }

    /// Break ties of the current ordering by `key`, descending
    pub fn then_by_descending<K, F>(&self, key: F) -> OrderedQuery<T>
    where
        K: PartialOrd + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.refine(natural_key(key, Direction::Descending))
    }

    /// Break ties with a caller-supplied three-way comparison of keys
    pub fn then_by_with<K, F, C>(&self, key: F, compare: C, direction: Direction) -> OrderedQuery<T>
    where
        K: 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
        C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        self.refine(custom_key(key, compare, direction))
    }

    /// Break ties with a comparison that can fail
    pub fn try_then_by_with<K, F, C>(&self, key: F, compare: C, direction: Direction) -> OrderedQuery<T>
    where
        K: 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
        C: Fn(&K, &K) -> QueryResult<Ordering> + Send + Sync + 'static,
    {
        self.refine(fallible_key(key, compare, direction))
    }

    /// Number of keys in this ordering
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut link = self.ordering.parent.as_deref();
        while let Some(current) = link {
            depth += 1;
            link = current.parent.as_deref();
        }
        depth
    }
}

impl<T: Send + 'static> Sequence for OrderedQuery<T> {
    type Item = T;

    fn cursor(&self) -> Cursor<T> {
        self.sorted.iter()
    }
}

impl<T: Send + 'static> QueryExt<T> for OrderedQuery<T> {
    fn as_query(&self) -> &Query<T> {
        &self.sorted
    }

    fn into_query(self) -> Query<T> {
        self.sorted
    }
}

fn natural_key<T, K, F>(select: F, direction: Direction) -> Arc<dyn SortKey<T>>
where
    T: 'static,
    K: PartialOrd + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    Arc::new(KeySelector {
        select,
        compare: compare_natural::<K>,
        direction,
        _marker: PhantomData,
    })
}

fn custom_key<T, K, F, C>(select: F, compare: C, direction: Direction) -> Arc<dyn SortKey<T>>
where
    T: 'static,
    K: 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
    C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
{
    fallible_key(
        select,
        move |a: &K, b: &K| -> QueryResult<Ordering> { Ok(compare(a, b)) },
        direction,
    )
}

fn fallible_key<T, K, F, C>(select: F, compare: C, direction: Direction) -> Arc<dyn SortKey<T>>
where
    T: 'static,
    K: 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
    C: Fn(&K, &K) -> QueryResult<Ordering> + Send + Sync + 'static,
{
    Arc::new(KeySelector {
        select,
        compare,
        direction,
        _marker: PhantomData,
    })
}

/// Order by `key`, ascending
pub fn order_by<T, K, F>(q: Query<T>, key: F) -> OrderedQuery<T>
where
    T: Send + 'static,
    K: PartialOrd + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    start(q, natural_key(key, Direction::Ascending))
}

/// Order by `key`, descending
pub fn order_by_descending<T, K, F>(q: Query<T>, key: F) -> OrderedQuery<T>
where
    T: Send + 'static,
    K: PartialOrd + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    start(q, natural_key(key, Direction::Descending))
}

/// Order by `key` using a caller-supplied three-way comparison, for key types
/// without a natural order
pub fn order_by_with<T, K, F, C>(q: Query<T>, key: F, compare: C, direction: Direction) -> OrderedQuery<T>
where
    T: Send + 'static,
    K: 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
    C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
{
    start(q, custom_key(key, compare, direction))
}

/// Like [`order_by_with`], with a comparison that can fail. The first `Err`
/// ends the enumeration.
pub fn try_order_by_with<T, K, F, C>(q: Query<T>, key: F, compare: C, direction: Direction) -> OrderedQuery<T>
where
    T: Send + 'static,
    K: 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
    C: Fn(&K, &K) -> QueryResult<Ordering> + Send + Sync + 'static,
{
    start(q, fallible_key(key, compare, direction))
}

fn start<T: Send + 'static>(q: Query<T>, key: Arc<dyn SortKey<T>>) -> OrderedQuery<T> {
    OrderedQuery::new(q, Arc::new(OrderingLink { key, parent: None }))
}

fn sorted_by_keys<T: Send + 'static>(q: Query<T>, ordering: Arc<OrderingLink<T>>) -> Query<T> {
    q.chain(move |input| {
        let cursor = input.iter();
        let keys = ordering.keys();
        let buffer = input.config().buffer.clone();
        let label = input.label().to_string();
        deferred(move || {
            let items = materialize(cursor, &buffer, "order_by")?;
            let order = {
                let columns: Vec<(Box<dyn KeyColumn + '_>, Direction)> = keys
                    .iter()
                    .map(|key| (key.column(&items), key.direction()))
                    .collect();
                stable_order(items.len(), |a, b| {
                    for (column, direction) in &columns {
                        match column.compare(a, b)? {
                            Ordering::Equal => continue,
                            unequal => return Ok(direction.apply(unequal)),
                        }
                    }
                    Ok(Ordering::Equal)
                })?
            };
            log::debug!(
                "{}: ordered {} elements by {} key(s)",
                label,
                items.len(),
                keys.len()
            );
            Ok(permute(items, &order))
        })
    })
}

/// Materialize and stable-sort with a less-than function.
///
/// Cheaper than an ordering chain: no keys are extracted.
pub fn sort<T, F>(q: Query<T>, less: F) -> Query<T>
where
    T: Send + 'static,
    F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    let less = Arc::new(less);
    q.chain(move |input| {
        let less = Arc::clone(&less);
        let cursor = input.iter();
        let buffer = input.config().buffer.clone();
        deferred(move || {
            let items = materialize(cursor, &buffer, "sort")?;
            let order = stable_order(items.len(), |a, b| {
                let (x, y) = (&items[a], &items[b]);
                Ok(if less(x, y) {
                    Ordering::Less
                } else if less(y, x) {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                })
            })?;
            Ok(permute(items, &order))
        })
    })
}

/// Positions `0..len` in stable sorted order. Stops at the first comparison
/// error.
fn stable_order<F>(len: usize, mut compare: F) -> QueryResult<Vec<usize>>
where
    F: FnMut(usize, usize) -> QueryResult<Ordering>,
{
    let mut order: Vec<usize> = (0..len).collect();
    let mut scratch = Vec::with_capacity(len);
    merge_sort(&mut order, &mut scratch, &mut compare)?;
    Ok(order)
}

const INSERTION_THRESHOLD: usize = 16;

fn merge_sort<F>(order: &mut [usize], scratch: &mut Vec<usize>, compare: &mut F) -> QueryResult<()>
where
    F: FnMut(usize, usize) -> QueryResult<Ordering>,
{
    let len = order.len();
    if len <= INSERTION_THRESHOLD {
        for i in 1..len {
            let mut j = i;
            while j > 0 && compare(order[j - 1], order[j])? == Ordering::Greater {
                order.swap(j - 1, j);
                j -= 1;
            }
        }
        return Ok(());
    }

    let mid = len / 2;
    merge_sort(&mut order[..mid], scratch, compare)?;
    merge_sort(&mut order[mid..], scratch, compare)?;
    if compare(order[mid - 1], order[mid])? != Ordering::Greater {
        return Ok(());
    }

    scratch.clear();
    let (mut i, mut j) = (0, mid);
    while i < mid && j < len {
        // Take from the right run only when strictly smaller; keeps equal
        // elements in input order.
        if compare(order[j], order[i])? == Ordering::Less {
            scratch.push(order[j]);
            j += 1;
        } else {
            scratch.push(order[i]);
            i += 1;
        }
    }
    scratch.extend_from_slice(&order[i..mid]);
    scratch.extend_from_slice(&order[j..]);
    order.copy_from_slice(scratch);
    Ok(())
}

fn permute<T>(items: Vec<T>, order: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    order.iter().filter_map(|&i| slots[i].take()).collect()
}
