//! Query constructors
//!
//! In-memory sources are re-invocable: every enumeration starts over and
//! clones elements out of shared storage. Channel and stream sources are
//! single-use: the first enumeration drains them and later enumerations are
//! empty.

use futures::channel::mpsc::Receiver;
use futures::executor::block_on_stream;
use futures::stream::StreamExt;
use futures_core::Stream;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::error::{QueryError, QueryResult};
use crate::sequence::{Cursor, Query, Sequence};

/// Create a query over the elements of a vector
pub fn from_vec<T>(items: Vec<T>) -> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    let items: Arc<[T]> = items.into();
    Query::new(move || {
        let items = Arc::clone(&items);
        Box::new((0..items.len()).map(move |i| Ok(items[i].clone())))
    })
}

/// Create a query from any clonable iterable.
///
/// The iterable is cloned once per enumeration, so ranges and other cheap
/// iterators work well here.
pub fn from_iter<I>(iter: I) -> Query<I::Item>
where
    I: IntoIterator + Clone + Send + Sync + 'static,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    Query::new(move || Box::new(iter.clone().into_iter().map(Ok)))
}

/// Create a query over the `(key, value)` pairs of a map.
///
/// Pair order follows the map's own iteration order: sorted for `BTreeMap`,
/// unspecified for `HashMap`.
pub fn from_map<M, K, V>(map: M) -> Query<(K, V)>
where
    M: IntoIterator<Item = (K, V)> + Clone + Send + Sync + 'static,
    M::IntoIter: Send + 'static,
    K: Send + 'static,
    V: Send + 'static,
{
    from_iter(map)
}

/// Create a query over the characters of a string
pub fn from_chars(text: impl AsRef<str>) -> Query<char> {
    from_vec(text.as_ref().chars().collect())
}

/// `count` consecutive integers starting at `start`.
///
/// A range that runs past `i32::MAX` yields a single
/// [`QueryError::InvalidConfiguration`] on the first pull.
pub fn range(start: i32, count: usize) -> Query<i32> {
    Query::new(move || {
        let cursor: Cursor<i32> = match range_end(start, count) {
            Ok(Some(last)) => Box::new((start..=last).map(Ok)),
            Ok(None) => Box::new(std::iter::empty()),
            Err(err) => Box::new(std::iter::once(Err(err))),
        };
        cursor
    })
}

/// Last element of a range, `None` when it is empty
fn range_end(start: i32, count: usize) -> QueryResult<Option<i32>> {
    if count == 0 {
        return Ok(None);
    }
    i64::try_from(count - 1)
        .ok()
        .and_then(|offset| i64::from(start).checked_add(offset))
        .and_then(|last| i32::try_from(last).ok())
        .map(Some)
        .ok_or_else(|| {
            QueryError::InvalidConfiguration(format!(
                "range of {} elements starting at {} does not fit in i32",
                count, start
            ))
        })
}

/// `value` repeated `count` times
pub fn repeat<T>(value: T, count: usize) -> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    Query::new(move || Box::new(std::iter::repeat(value.clone()).take(count).map(Ok)))
}

/// Create an empty query
pub fn empty<T>() -> Query<T>
where
    T: Send + 'static,
{
    Query::new(|| Box::new(std::iter::empty()))
}

/// Emit a single element
pub fn once<T>(value: T) -> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    Query::new(move || Box::new(std::iter::once(Ok(value.clone()))))
}

/// Wrap a user-defined sequence
pub fn from_sequence<S>(sequence: S) -> Query<S::Item>
where
    S: Sequence + Send + Sync + 'static,
    S::Item: Send + 'static,
{
    Query::new(move || sequence.cursor())
}

/// Create a single-use query that blocks on a `futures` stream.
///
/// Do not enumerate it from inside an async task: each pull blocks the
/// current thread until the stream produces an item or ends.
pub fn from_stream<S>(stream: S) -> Query<S::Item>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    let slot = Arc::new(Mutex::new(Some(Box::pin(stream))));
    Query::new(move || {
        let taken = match slot.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match taken {
            Some(stream) => Box::new(block_on_stream(stream).map(Ok)) as Cursor<S::Item>,
            None => {
                log::debug!("single-use stream source enumerated again; yielding nothing");
                Box::new(std::iter::empty())
            }
        }
    })
}

/// Create a single-use query that drains a channel until every sender is
/// dropped
pub fn from_channel<T>(receiver: Receiver<T>) -> Query<T>
where
    T: Send + 'static,
{
    from_stream(receiver)
}

/// Like [`from_channel`], but the enumeration also ends once `signal`
/// completes. Items still buffered in the channel at that point are not
/// yielded.
pub fn from_channel_until<T, F>(receiver: Receiver<T>, signal: F) -> Query<T>
where
    T: Send + 'static,
    F: Future + Send + 'static,
    F::Output: Send,
{
    from_stream(receiver.take_until(signal))
}

impl<T> From<Vec<T>> for Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from(items: Vec<T>) -> Self {
        from_vec(items)
    }
}
