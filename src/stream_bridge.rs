//! Bridge from queries to `futures` streams.
//!
//! The other direction lives in [`crate::sources::from_stream`].

use async_stream::stream;
use futures_util::stream::{BoxStream, StreamExt};

use crate::error::QueryResult;
use crate::sequence::Query;

/// Expose a query as a stream.
///
/// The enumeration starts when the stream is first polled, and each poll pulls
/// one element synchronously. An `Err` item ends the stream after it is
/// yielded.
pub fn into_stream<T>(query: Query<T>) -> BoxStream<'static, QueryResult<T>>
where
    T: Send + 'static,
{
    stream! {
        for item in query.iter() {
            yield item;
        }
    }
    .boxed()
}

/// Like [`into_stream`], dropping the `Result` wrapper and ending the stream
/// silently at the first error, which is logged.
pub fn into_value_stream<T>(query: Query<T>) -> BoxStream<'static, T>
where
    T: Send + 'static,
{
    let label = query.label().to_string();
    stream! {
        for item in query.iter() {
            match item {
                Ok(value) => yield value,
                Err(err) => {
                    log::warn!("{}: value stream ended by error: {}", label, err);
                    break;
                }
            }
        }
    }
    .boxed()
}
