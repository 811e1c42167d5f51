//! Query operators
//!
//! Each operator is a free function from one (or two) input queries to a new
//! query. Nothing is pulled from an input until the output is pulled; the
//! buffering operators (ordering, grouping, reverse, join tables, set
//! pre-loading) materialize on the first pull of each enumeration.

pub mod filtering;
pub mod grouping;
pub mod join;
pub mod ordering;
pub mod pairwise;
pub mod set_ops;

use crate::error::QueryResult;
use crate::query_configuration::BufferConfig;
use crate::sequence::Cursor;

/// Drain a cursor into a vector, enforcing the buffer limit.
pub(crate) fn materialize<T>(
    cursor: Cursor<T>,
    buffer: &BufferConfig,
    operator: &'static str,
) -> QueryResult<Vec<T>> {
    let mut items = Vec::with_capacity(buffer.preallocate());
    for item in cursor {
        items.push(item?);
        buffer.check(operator, items.len())?;
    }
    Ok(items)
}

/// A cursor that runs `prepare` on its first pull and then yields the
/// prepared elements. A failed preparation yields the error once.
pub(crate) fn deferred<U, F>(prepare: F) -> Cursor<U>
where
    U: Send + 'static,
    F: FnOnce() -> QueryResult<Vec<U>> + Send + 'static,
{
    let mut prepare = Some(prepare);
    let mut ready: Option<std::vec::IntoIter<U>> = None;
    Box::new(std::iter::from_fn(move || {
        if let Some(prepare) = prepare.take() {
            match prepare() {
                Ok(items) => ready = Some(items.into_iter()),
                Err(err) => return Some(Err(err)),
            }
        }
        ready.as_mut()?.next().map(Ok)
    }))
}
