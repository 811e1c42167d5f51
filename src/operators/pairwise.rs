//! Zip: two inputs advanced in lockstep.

use std::sync::Arc;

use crate::error::QueryResult;
use crate::sequence::{Cursor, Query};

struct Zip<A, B, R> {
    first: Option<Cursor<A>>,
    second: Option<Cursor<B>>,
    /// Source of `second`, consumed when the first pair is requested
    second_source: Option<Query<B>>,
    result: Arc<dyn Fn(A, B) -> R + Send + Sync>,
}

impl<A, B, R> Zip<A, B, R>
where
    B: Send + 'static,
{
    fn release(&mut self) {
        self.first = None;
        self.second = None;
        self.second_source = None;
    }

    fn pull_second(&mut self) -> Option<QueryResult<B>> {
        if let Some(source) = self.second_source.take() {
            self.second = Some(source.iter());
        }
        self.second.as_mut()?.next()
    }
}

impl<A, B, R> Iterator for Zip<A, B, R>
where
    B: Send + 'static,
{
    type Item = QueryResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let a = match self.first.as_mut()?.next() {
            Some(Ok(a)) => a,
            Some(Err(err)) => {
                self.release();
                return Some(Err(err));
            }
            None => {
                self.release();
                return None;
            }
        };
        match self.pull_second() {
            Some(Ok(b)) => Some(Ok((self.result)(a, b))),
            Some(Err(err)) => {
                self.release();
                Some(Err(err))
            }
            None => {
                self.release();
                None
            }
        }
    }
}

/// Combine elements of `first` and `second` pairwise, stopping at the end of
/// the shorter input.
///
/// `first` is pulled before `second`, so when `first` runs out the matching
/// element of `second` is never pulled. Both cursors are dropped as soon as
/// either input ends or fails.
pub fn zip<A, B, R, F>(first: Query<A>, second: Query<B>, result: F) -> Query<R>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    let result: Arc<dyn Fn(A, B) -> R + Send + Sync> = Arc::new(result);
    first.chain(move |first| {
        Box::new(Zip {
            first: Some(first.iter()),
            second: None,
            second_source: Some(second.clone()),
            result: Arc::clone(&result),
        })
    })
}
