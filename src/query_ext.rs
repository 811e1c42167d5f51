use futures::channel::mpsc::Sender;
use futures_util::stream::BoxStream;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::iter::Sum;

use crate::error::QueryResult;
use crate::operators::grouping::{self, Group};
use crate::operators::ordering::{self, Direction, OrderedQuery};
use crate::operators::{filtering, join, pairwise, set_ops};
use crate::pipe::Pipe;
use crate::sequence::Query;
use crate::stream_bridge;
use crate::terminal;

/// Extension trait providing LINQ-style operators on queries.
///
/// Operators consume the receiver and return a new lazy query; terminal
/// operators borrow it and run one enumeration. Implemented for [`Query`] and
/// [`OrderedQuery`]; the free functions in [`crate::operators`] and
/// [`crate::terminal`] do the work.
pub trait QueryExt<T: Send + 'static>: Sized {
    fn as_query(&self) -> &Query<T>;

    fn into_query(self) -> Query<T>;

    // Filtering and projection

    fn filter<F>(self, predicate: F) -> Query<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        filtering::filter(self.into_query(), predicate)
    }

    fn filter_indexed<F>(self, predicate: F) -> Query<T>
    where
        F: Fn(usize, &T) -> bool + Send + Sync + 'static,
    {
        filtering::filter_indexed(self.into_query(), predicate)
    }

    fn try_filter<F>(self, predicate: F) -> Query<T>
    where
        F: Fn(&T) -> QueryResult<bool> + Send + Sync + 'static,
    {
        filtering::try_filter(self.into_query(), predicate)
    }

    fn select<U, F>(self, selector: F) -> Query<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        filtering::select(self.into_query(), selector)
    }

    fn select_indexed<U, F>(self, selector: F) -> Query<U>
    where
        U: Send + 'static,
        F: Fn(usize, T) -> U + Send + Sync + 'static,
    {
        filtering::select_indexed(self.into_query(), selector)
    }

    fn try_select<U, F>(self, selector: F) -> Query<U>
    where
        U: Send + 'static,
        F: Fn(T) -> QueryResult<U> + Send + Sync + 'static,
    {
        filtering::try_select(self.into_query(), selector)
    }

    fn select_many<U, I, F>(self, selector: F) -> Query<U>
    where
        U: Send + 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: Send + 'static,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        filtering::select_many(self.into_query(), selector)
    }

    fn select_many_indexed<U, I, F>(self, selector: F) -> Query<U>
    where
        U: Send + 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: Send + 'static,
        F: Fn(usize, T) -> I + Send + Sync + 'static,
    {
        filtering::select_many_indexed(self.into_query(), selector)
    }

    fn select_many_by<U, R, I, C, F>(self, collection: C, result: F) -> Query<R>
    where
        U: Send + 'static,
        R: Send + 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: Send + 'static,
        C: Fn(&T) -> I + Send + Sync + 'static,
        F: Fn(&T, U) -> R + Send + Sync + 'static,
    {
        filtering::select_many_by(self.into_query(), collection, result)
    }

    // Windowing and combining

    fn take(self, n: usize) -> Query<T> {
        filtering::take(self.into_query(), n)
    }

    fn skip(self, n: usize) -> Query<T> {
        filtering::skip(self.into_query(), n)
    }

    fn take_while<F>(self, predicate: F) -> Query<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        filtering::take_while(self.into_query(), predicate)
    }

    fn take_while_indexed<F>(self, predicate: F) -> Query<T>
    where
        F: Fn(usize, &T) -> bool + Send + Sync + 'static,
    {
        filtering::take_while_indexed(self.into_query(), predicate)
    }

    fn skip_while<F>(self, predicate: F) -> Query<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        filtering::skip_while(self.into_query(), predicate)
    }

    fn skip_while_indexed<F>(self, predicate: F) -> Query<T>
    where
        F: Fn(usize, &T) -> bool + Send + Sync + 'static,
    {
        filtering::skip_while_indexed(self.into_query(), predicate)
    }

    fn concat(self, other: impl QueryExt<T>) -> Query<T> {
        filtering::concat(self.into_query(), other.into_query())
    }

    fn append(self, item: T) -> Query<T>
    where
        T: Clone + Sync,
    {
        filtering::append(self.into_query(), item)
    }

    fn prepend(self, item: T) -> Query<T>
    where
        T: Clone + Sync,
    {
        filtering::prepend(self.into_query(), item)
    }

    fn default_if_empty(self, item: T) -> Query<T>
    where
        T: Clone + Sync,
    {
        filtering::default_if_empty(self.into_query(), item)
    }

    fn reverse(self) -> Query<T> {
        filtering::reverse(self.into_query())
    }

    // Set operations

    fn distinct(self) -> Query<T>
    where
        T: Hash + Eq + Clone,
    {
        set_ops::distinct(self.into_query())
    }

    fn distinct_by<K, F>(self, key: F) -> Query<T>
    where
        K: Hash + Eq + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        set_ops::distinct_by(self.into_query(), key)
    }

    fn distinct_sorted(self) -> Query<T>
    where
        T: PartialEq + Clone,
    {
        set_ops::distinct_sorted(self.into_query())
    }

    fn distinct_sorted_by<K, F>(self, key: F) -> Query<T>
    where
        K: PartialEq + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        set_ops::distinct_sorted_by(self.into_query(), key)
    }

    fn union(self, other: impl QueryExt<T>) -> Query<T>
    where
        T: Hash + Eq + Clone,
    {
        set_ops::union(self.into_query(), other.into_query())
    }

    fn union_by<K, F>(self, other: impl QueryExt<T>, key: F) -> Query<T>
    where
        K: Hash + Eq + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        set_ops::union_by(self.into_query(), other.into_query(), key)
    }

    fn intersect(self, other: impl QueryExt<T>) -> Query<T>
    where
        T: Hash + Eq + Clone,
    {
        set_ops::intersect(self.into_query(), other.into_query())
    }

    fn intersect_by<K, F>(self, other: impl QueryExt<T>, key: F) -> Query<T>
    where
        K: Hash + Eq + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        set_ops::intersect_by(self.into_query(), other.into_query(), key)
    }

    fn except(self, other: impl QueryExt<T>) -> Query<T>
    where
        T: Hash + Eq + Clone,
    {
        set_ops::except(self.into_query(), other.into_query())
    }

    fn except_by<K, F>(self, other: impl QueryExt<T>, key: F) -> Query<T>
    where
        K: Hash + Eq + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        set_ops::except_by(self.into_query(), other.into_query(), key)
    }

    // Ordering

    fn order_by<K, F>(self, key: F) -> OrderedQuery<T>
    where
        K: PartialOrd + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        ordering::order_by(self.into_query(), key)
    }

    fn order_by_descending<K, F>(self, key: F) -> OrderedQuery<T>
    where
        K: PartialOrd + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        ordering::order_by_descending(self.into_query(), key)
    }

    fn order_by_with<K, F, C>(self, key: F, compare: C, direction: Direction) -> OrderedQuery<T>
    where
        K: 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
        C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        ordering::order_by_with(self.into_query(), key, compare, direction)
    }

    fn try_order_by_with<K, F, C>(self, key: F, compare: C, direction: Direction) -> OrderedQuery<T>
    where
        K: 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
        C: Fn(&K, &K) -> QueryResult<Ordering> + Send + Sync + 'static,
    {
        ordering::try_order_by_with(self.into_query(), key, compare, direction)
    }

    fn sort<F>(self, less: F) -> Query<T>
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        ordering::sort(self.into_query(), less)
    }

    // Grouping and joins

    fn group_by<K, V, FK, FV>(self, key: FK, element: FV) -> Query<Group<K, V>>
    where
        K: Hash + Eq + Clone + Send + 'static,
        V: Send + 'static,
        FK: Fn(&T) -> K + Send + Sync + 'static,
        FV: Fn(T) -> V + Send + Sync + 'static,
    {
        grouping::group_by(self.into_query(), key, element)
    }

    fn group_by_key<K, F>(self, key: F) -> Query<Group<K, T>>
    where
        K: Hash + Eq + Clone + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        grouping::group_by_key(self.into_query(), key)
    }

    fn join<I, K, R, FO, FI, FR>(
        self,
        inner: impl QueryExt<I>,
        outer_key: FO,
        inner_key: FI,
        result: FR,
    ) -> Query<R>
    where
        I: Send + 'static,
        K: Hash + Eq + Send + 'static,
        R: Send + 'static,
        FO: Fn(&T) -> K + Send + Sync + 'static,
        FI: Fn(&I) -> K + Send + Sync + 'static,
        FR: Fn(&T, &I) -> R + Send + Sync + 'static,
    {
        join::join(self.into_query(), inner.into_query(), outer_key, inner_key, result)
    }

    fn left_join<I, K, R, FO, FI, FR, FL>(
        self,
        inner: impl QueryExt<I>,
        outer_key: FO,
        inner_key: FI,
        result: FR,
        left_only: FL,
    ) -> Query<R>
    where
        I: Send + 'static,
        K: Hash + Eq + Send + 'static,
        R: Send + 'static,
        FO: Fn(&T) -> K + Send + Sync + 'static,
        FI: Fn(&I) -> K + Send + Sync + 'static,
        FR: Fn(&T, &I) -> R + Send + Sync + 'static,
        FL: Fn(&T) -> R + Send + Sync + 'static,
    {
        join::left_join(
            self.into_query(),
            inner.into_query(),
            outer_key,
            inner_key,
            result,
            left_only,
        )
    }

    fn group_join<I, K, R, FO, FI, FR>(
        self,
        inner: impl QueryExt<I>,
        outer_key: FO,
        inner_key: FI,
        result: FR,
    ) -> Query<R>
    where
        I: Clone + Send + 'static,
        K: Hash + Eq + Send + 'static,
        R: Send + 'static,
        FO: Fn(&T) -> K + Send + Sync + 'static,
        FI: Fn(&I) -> K + Send + Sync + 'static,
        FR: Fn(T, Vec<I>) -> R + Send + Sync + 'static,
    {
        join::group_join(self.into_query(), inner.into_query(), outer_key, inner_key, result)
    }

    fn join_on<I, R, P, FR>(self, inner: impl QueryExt<I>, predicate: P, result: FR) -> Query<R>
    where
        I: Send + 'static,
        R: Send + 'static,
        P: Fn(&T, &I) -> bool + Send + Sync + 'static,
        FR: Fn(&T, &I) -> R + Send + Sync + 'static,
    {
        join::join_on(self.into_query(), inner.into_query(), predicate, result)
    }

    fn group_join_on<I, R, P, FR>(self, inner: impl QueryExt<I>, predicate: P, result: FR) -> Query<R>
    where
        I: Clone + Send + 'static,
        R: Send + 'static,
        P: Fn(&T, &I) -> bool + Send + Sync + 'static,
        FR: Fn(T, Vec<I>) -> R + Send + Sync + 'static,
    {
        join::group_join_on(self.into_query(), inner.into_query(), predicate, result)
    }

    fn zip<B, R, F>(self, other: impl QueryExt<B>, result: F) -> Query<R>
    where
        B: Send + 'static,
        R: Send + 'static,
        F: Fn(T, B) -> R + Send + Sync + 'static,
    {
        pairwise::zip(self.into_query(), other.into_query(), result)
    }

    // Bridges

    /// Run this query through a reusable pipe
    fn pipe<O: Send + 'static>(self, pipe: &Pipe<T, O>) -> Query<O> {
        pipe.apply(self.into_query())
    }

    fn into_stream(self) -> BoxStream<'static, QueryResult<T>> {
        stream_bridge::into_stream(self.into_query())
    }

    // Terminal operators

    fn to_vec(&self) -> QueryResult<Vec<T>> {
        terminal::to_vec(self.as_query())
    }

    fn to_map<K, F>(&self, key: F) -> QueryResult<HashMap<K, T>>
    where
        K: Hash + Eq,
        F: Fn(&T) -> K,
    {
        terminal::to_map(self.as_query(), key)
    }

    fn to_map_by<K, V, FK, FV>(&self, key: FK, value: FV) -> QueryResult<HashMap<K, V>>
    where
        K: Hash + Eq,
        FK: Fn(&T) -> K,
        FV: Fn(T) -> V,
    {
        terminal::to_map_by(self.as_query(), key, value)
    }

    fn to_channel(&self, sender: Sender<T>) -> QueryResult<usize> {
        terminal::to_channel(self.as_query(), sender)
    }

    fn count(&self) -> QueryResult<usize> {
        terminal::count(self.as_query())
    }

    fn count_with<F: Fn(&T) -> bool>(&self, predicate: F) -> QueryResult<usize> {
        terminal::count_with(self.as_query(), predicate)
    }

    fn any(&self) -> QueryResult<bool> {
        terminal::any(self.as_query())
    }

    fn any_with<F: Fn(&T) -> bool>(&self, predicate: F) -> QueryResult<bool> {
        terminal::any_with(self.as_query(), predicate)
    }

    fn all<F: Fn(&T) -> bool>(&self, predicate: F) -> QueryResult<bool> {
        terminal::all(self.as_query(), predicate)
    }

    fn contains(&self, value: &T) -> QueryResult<bool>
    where
        T: PartialEq,
    {
        terminal::contains(self.as_query(), value)
    }

    fn first(&self) -> QueryResult<Option<T>> {
        terminal::first(self.as_query())
    }

    fn first_with<F: Fn(&T) -> bool>(&self, predicate: F) -> QueryResult<Option<T>> {
        terminal::first_with(self.as_query(), predicate)
    }

    fn last(&self) -> QueryResult<Option<T>> {
        terminal::last(self.as_query())
    }

    fn last_with<F: Fn(&T) -> bool>(&self, predicate: F) -> QueryResult<Option<T>> {
        terminal::last_with(self.as_query(), predicate)
    }

    fn single(&self) -> QueryResult<Option<T>> {
        terminal::single(self.as_query())
    }

    fn single_with<F: Fn(&T) -> bool>(&self, predicate: F) -> QueryResult<Option<T>> {
        terminal::single_with(self.as_query(), predicate)
    }

    fn element_at(&self, index: usize) -> QueryResult<Option<T>> {
        terminal::element_at(self.as_query(), index)
    }

    fn index_of(&self, value: &T) -> QueryResult<Option<usize>>
    where
        T: PartialEq,
    {
        terminal::index_of(self.as_query(), value)
    }

    fn aggregate<F: Fn(T, T) -> T>(&self, f: F) -> QueryResult<Option<T>> {
        terminal::aggregate(self.as_query(), f)
    }

    fn aggregate_with_seed<A, F: Fn(A, T) -> A>(&self, seed: A, f: F) -> QueryResult<A> {
        terminal::aggregate_with_seed(self.as_query(), seed, f)
    }

    fn aggregate_with_seed_by<A, R, F, S>(&self, seed: A, f: F, result: S) -> QueryResult<R>
    where
        F: Fn(A, T) -> A,
        S: FnOnce(A) -> R,
    {
        terminal::aggregate_with_seed_by(self.as_query(), seed, f, result)
    }

    fn sum(&self) -> QueryResult<T>
    where
        T: Sum<T>,
    {
        terminal::sum(self.as_query())
    }

    fn average(&self) -> QueryResult<Option<f64>>
    where
        T: Into<f64>,
    {
        terminal::average(self.as_query())
    }

    fn average_by<F: Fn(&T) -> f64>(&self, value: F) -> QueryResult<Option<f64>> {
        terminal::average_by(self.as_query(), value)
    }

    fn min(&self) -> QueryResult<Option<T>>
    where
        T: PartialOrd,
    {
        terminal::min(self.as_query())
    }

    fn max(&self) -> QueryResult<Option<T>>
    where
        T: PartialOrd,
    {
        terminal::max(self.as_query())
    }

    fn min_by_key<K: PartialOrd, F: Fn(&T) -> K>(&self, key: F) -> QueryResult<Option<T>> {
        terminal::min_by_key(self.as_query(), key)
    }

    fn max_by_key<K: PartialOrd, F: Fn(&T) -> K>(&self, key: F) -> QueryResult<Option<T>> {
        terminal::max_by_key(self.as_query(), key)
    }

    fn for_each<F: FnMut(T)>(&self, f: F) -> QueryResult<()> {
        terminal::for_each(self.as_query(), f)
    }

    fn for_each_indexed<F: FnMut(usize, T)>(&self, f: F) -> QueryResult<()> {
        terminal::for_each_indexed(self.as_query(), f)
    }

    fn sequence_equal(&self, other: &impl QueryExt<T>) -> QueryResult<bool>
    where
        T: PartialEq,
    {
        terminal::sequence_equal(self.as_query(), other.as_query())
    }
}

impl<T: Send + 'static> QueryExt<T> for Query<T> {
    fn as_query(&self) -> &Query<T> {
        self
    }

    fn into_query(self) -> Query<T> {
        self
    }
}
