//! Filtering, projection and windowing operators.
//!
//! All of these stream: an output element is produced from at most the input
//! elements needed to decide it, with `reverse` as the only buffering
//! exception.

use std::iter;
use std::sync::Arc;

use crate::error::QueryResult;
use crate::operators::{deferred, materialize};
use crate::sequence::{Cursor, Query};

/// Keep the elements that satisfy `predicate`
pub fn filter<T, F>(q: Query<T>, predicate: F) -> Query<T>
where
    T: Send + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    q.chain(move |input| {
        let predicate = Arc::clone(&predicate);
        Box::new(input.iter().filter(move |item| match item {
            Ok(value) => predicate(value),
            Err(_) => true,
        }))
    })
}

/// Like [`filter`], with the element's position in the input
pub fn filter_indexed<T, F>(q: Query<T>, predicate: F) -> Query<T>
where
    T: Send + 'static,
    F: Fn(usize, &T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    q.chain(move |input| {
        let predicate = Arc::clone(&predicate);
        let mut index = 0;
        Box::new(input.iter().filter(move |item| match item {
            Ok(value) => {
                let keep = predicate(index, value);
                index += 1;
                keep
            }
            Err(_) => true,
        }))
    })
}

/// Filter with a predicate that may fail; a failure aborts the enumeration
pub fn try_filter<T, F>(q: Query<T>, predicate: F) -> Query<T>
where
    T: Send + 'static,
    F: Fn(&T) -> QueryResult<bool> + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    q.chain(move |input| {
        let predicate = Arc::clone(&predicate);
        let mut cursor = input.iter();
        Box::new(iter::from_fn(move || loop {
            match cursor.next()? {
                Ok(value) => match predicate(&value) {
                    Ok(true) => return Some(Ok(value)),
                    Ok(false) => continue,
                    Err(err) => return Some(Err(err)),
                },
                Err(err) => return Some(Err(err)),
            }
        }))
    })
}

/// Project each element
pub fn select<T, U, F>(q: Query<T>, selector: F) -> Query<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    let selector = Arc::new(selector);
    q.chain(move |input| {
        let selector = Arc::clone(&selector);
        Box::new(input.iter().map(move |item| item.map(|value| selector(value))))
    })
}

/// Like [`select`], with the element's position in the input
pub fn select_indexed<T, U, F>(q: Query<T>, selector: F) -> Query<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(usize, T) -> U + Send + Sync + 'static,
{
    let selector = Arc::new(selector);
    q.chain(move |input| {
        let selector = Arc::clone(&selector);
        Box::new(
            input
                .iter()
                .enumerate()
                .map(move |(index, item)| item.map(|value| selector(index, value))),
        )
    })
}

/// Project with a selector that may fail; a failure aborts the enumeration
pub fn try_select<T, U, F>(q: Query<T>, selector: F) -> Query<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> QueryResult<U> + Send + Sync + 'static,
{
    let selector = Arc::new(selector);
    q.chain(move |input| {
        let selector = Arc::clone(&selector);
        Box::new(input.iter().map(move |item| item.and_then(|value| selector(value))))
    })
}

/// Project each element to a collection and flatten the results
pub fn select_many<T, U, I, F>(q: Query<T>, selector: F) -> Query<U>
where
    T: Send + 'static,
    U: Send + 'static,
    I: IntoIterator<Item = U>,
    I::IntoIter: Send + 'static,
    F: Fn(T) -> I + Send + Sync + 'static,
{
    select_many_indexed(q, move |_, value| selector(value))
}

/// Like [`select_many`], with the element's position in the input
pub fn select_many_indexed<T, U, I, F>(q: Query<T>, selector: F) -> Query<U>
where
    T: Send + 'static,
    U: Send + 'static,
    I: IntoIterator<Item = U>,
    I::IntoIter: Send + 'static,
    F: Fn(usize, T) -> I + Send + Sync + 'static,
{
    let selector = Arc::new(selector);
    q.chain(move |input| {
        let selector = Arc::clone(&selector);
        let mut outer = input.iter();
        let mut index = 0;
        let mut inner: Option<I::IntoIter> = None;
        Box::new(iter::from_fn(move || loop {
            if let Some(current) = inner.as_mut() {
                if let Some(value) = current.next() {
                    return Some(Ok(value));
                }
                inner = None;
            }
            match outer.next()? {
                Ok(value) => {
                    inner = Some(selector(index, value).into_iter());
                    index += 1;
                }
                Err(err) => return Some(Err(err)),
            }
        }))
    })
}

/// Project each element to a collection, then combine the element with each
/// item of its collection
pub fn select_many_by<T, U, R, I, C, F>(q: Query<T>, collection: C, result: F) -> Query<R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Send + 'static,
    I: IntoIterator<Item = U>,
    I::IntoIter: Send + 'static,
    C: Fn(&T) -> I + Send + Sync + 'static,
    F: Fn(&T, U) -> R + Send + Sync + 'static,
{
    let collection = Arc::new(collection);
    let result = Arc::new(result);
    q.chain(move |input| {
        let collection = Arc::clone(&collection);
        let result = Arc::clone(&result);
        let mut outer = input.iter();
        let mut current: Option<(T, I::IntoIter)> = None;
        Box::new(iter::from_fn(move || loop {
            if let Some((value, items)) = current.as_mut() {
                if let Some(item) = items.next() {
                    return Some(Ok(result(&*value, item)));
                }
                current = None;
            }
            match outer.next()? {
                Ok(value) => {
                    let items = collection(&value).into_iter();
                    current = Some((value, items));
                }
                Err(err) => return Some(Err(err)),
            }
        }))
    })
}

/// First `n` elements; element `n + 1` is never pulled
pub fn take<T>(q: Query<T>, n: usize) -> Query<T>
where
    T: Send + 'static,
{
    q.chain(move |input| Box::new(input.iter().take(n)))
}

/// Everything after the first `n` elements
pub fn skip<T>(q: Query<T>, n: usize) -> Query<T>
where
    T: Send + 'static,
{
    q.chain(move |input| {
        let mut cursor = input.iter();
        let mut to_skip = n;
        Box::new(iter::from_fn(move || {
            while to_skip > 0 {
                to_skip -= 1;
                if let Err(err) = cursor.next()? {
                    return Some(Err(err));
                }
            }
            cursor.next()
        }))
    })
}

/// Elements up to (excluding) the first one failing `predicate`
pub fn take_while<T, F>(q: Query<T>, predicate: F) -> Query<T>
where
    T: Send + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    take_while_indexed(q, move |_, value| predicate(value))
}

/// Like [`take_while`], with the element's position in the input
pub fn take_while_indexed<T, F>(q: Query<T>, predicate: F) -> Query<T>
where
    T: Send + 'static,
    F: Fn(usize, &T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    q.chain(move |input| {
        let predicate = Arc::clone(&predicate);
        let mut cursor = Some(input.iter());
        let mut index = 0;
        Box::new(iter::from_fn(move || {
            let next = cursor.as_mut()?.next()?;
            match next {
                Ok(value) if predicate(index, &value) => {
                    index += 1;
                    Some(Ok(value))
                }
                Ok(_) => {
                    cursor = None;
                    None
                }
                Err(err) => Some(Err(err)),
            }
        }))
    })
}

/// Elements from the first one failing `predicate` onward
pub fn skip_while<T, F>(q: Query<T>, predicate: F) -> Query<T>
where
    T: Send + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    skip_while_indexed(q, move |_, value| predicate(value))
}

/// Like [`skip_while`], with the element's position in the input
pub fn skip_while_indexed<T, F>(q: Query<T>, predicate: F) -> Query<T>
where
    T: Send + 'static,
    F: Fn(usize, &T) -> bool + Send + Sync + 'static,
{
    let predicate = Arc::new(predicate);
    q.chain(move |input| {
        let predicate = Arc::clone(&predicate);
        let mut cursor = input.iter();
        let mut skipping = true;
        let mut index = 0;
        Box::new(iter::from_fn(move || {
            if !skipping {
                return cursor.next();
            }
            loop {
                match cursor.next()? {
                    Ok(value) => {
                        if !predicate(index, &value) {
                            skipping = false;
                            return Some(Ok(value));
                        }
                        index += 1;
                    }
                    Err(err) => return Some(Err(err)),
                }
            }
        }))
    })
}

/// All elements of `first`, then all elements of `second`.
///
/// `second` is not enumerated until `first` is exhausted.
pub fn concat<T>(first: Query<T>, second: Query<T>) -> Query<T>
where
    T: Send + 'static,
{
    first.chain(move |first| {
        let mut head = Some(first.iter());
        let second = second.clone();
        let mut tail: Option<Cursor<T>> = None;
        Box::new(iter::from_fn(move || {
            if let Some(cursor) = head.as_mut() {
                match cursor.next() {
                    None => head = None,
                    item => return item,
                }
            }
            tail.get_or_insert_with(|| second.iter()).next()
        }))
    })
}

/// The input followed by `item`
pub fn append<T>(q: Query<T>, item: T) -> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    concat(q, crate::sources::once(item))
}

/// `item` followed by the input
pub fn prepend<T>(q: Query<T>, item: T) -> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    q.chain(move |input| Box::new(iter::once(Ok(item.clone())).chain(input.iter())))
}

/// The input, or `item` alone if the input is empty
pub fn default_if_empty<T>(q: Query<T>, item: T) -> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    q.chain(move |input| {
        let mut cursor = input.iter();
        let mut fallback = Some(item.clone());
        Box::new(iter::from_fn(move || match cursor.next() {
            Some(next) => {
                fallback = None;
                Some(next)
            }
            None => fallback.take().map(Ok),
        }))
    })
}

/// The input in reverse order. Buffers the whole input on the first pull.
pub fn reverse<T>(q: Query<T>) -> Query<T>
where
    T: Send + 'static,
{
    q.chain(|input| {
        let cursor = input.iter();
        let buffer = input.config().buffer.clone();
        let label = input.label().to_string();
        deferred(move || {
            let mut items = materialize(cursor, &buffer, "reverse")?;
            log::trace!("{}: reverse buffered {} elements", label, items.len());
            items.reverse();
            Ok(items)
        })
    })
}
