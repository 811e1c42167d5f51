//! The sequence primitive every operator is built from.
//!
//! A [`Sequence`] is a re-invocable procedure: each call to
//! [`Sequence::cursor`] starts a fresh, independent enumeration. A [`Cursor`]
//! is the pull point of one enumeration; dropping it releases whatever the
//! enumeration holds (buffers, inner cursors, channel receivers).
//!
//! [`Query`] is the type-erased, cheaply clonable sequence returned by every
//! operator. Cloning a query clones the operator chain, never the data.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::error::QueryResult;
use crate::query_configuration::QueryConfig;

/// One enumeration of a sequence, pulled with `Iterator::next`.
pub type Cursor<T> = Box<dyn Iterator<Item = QueryResult<T>> + Send>;

/// Anything that can produce a fresh enumeration of `Item`s.
///
/// Implement this for custom sources and turn them into a query with
/// [`crate::sources::from_sequence`].
pub trait Sequence {
    type Item;

    /// Start a new enumeration from the beginning.
    fn cursor(&self) -> Cursor<Self::Item>;
}

/// A lazy, re-invocable query over elements of type `T`
pub struct Query<T> {
    source: Arc<dyn Fn() -> Cursor<T> + Send + Sync>,
    config: Arc<QueryConfig>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Query {
            source: Arc::clone(&self.source),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("item", &std::any::type_name::<T>())
            .field("config", &self.config)
            .finish()
    }
}

impl<T: Send + 'static> Query<T> {
    /// Create a query from a cursor factory, with the default configuration
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Cursor<T> + Send + Sync + 'static,
    {
        Self::from_parts(f, Arc::new(QueryConfig::default()))
    }

    /// Build a downstream query that inherits this query's configuration.
    ///
    /// `f` is called once per enumeration with this query as input.
    pub(crate) fn chain<U, F>(self, f: F) -> Query<U>
    where
        U: Send + 'static,
        F: Fn(&Query<T>) -> Cursor<U> + Send + Sync + 'static,
    {
        let config = Arc::clone(&self.config);
        Query::from_parts(move || f(&self), config)
    }

    pub(crate) fn label(&self) -> &str {
        self.config.name()
    }

    fn from_parts<F>(f: F, config: Arc<QueryConfig>) -> Self
    where
        F: Fn() -> Cursor<T> + Send + Sync + 'static,
    {
        Query {
            source: Arc::new(move || Box::new(Fuse::new(f())) as Cursor<T>),
            config,
        }
    }

    /// Replace the configuration of this query.
    ///
    /// Operators chained after this call inherit the new configuration;
    /// operators chained before it keep the one they were built with, so set
    /// it on the source.
    pub fn with_config(self, config: QueryConfig) -> QueryResult<Self> {
        config.validate()?;
        Ok(Query {
            source: self.source,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Start a new enumeration
    pub fn iter(&self) -> Cursor<T> {
        (self.source)()
    }

    /// Push-style enumeration.
    ///
    /// Invokes `f` once per element, in order, until `f` breaks, the elements
    /// are exhausted or an error occurs. Returns `Ok(true)` if the sequence was
    /// exhausted and `Ok(false)` if `f` stopped it early.
    pub fn for_each_while<F>(&self, mut f: F) -> QueryResult<bool>
    where
        F: FnMut(T) -> QueryResult<ControlFlow<()>>,
    {
        for item in self.iter() {
            if f(item?)?.is_break() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<T: Send + 'static> Sequence for Query<T> {
    type Item = T;

    fn cursor(&self) -> Cursor<T> {
        self.iter()
    }
}

impl<'a, T: Send + 'static> IntoIterator for &'a Query<T> {
    type Item = QueryResult<T>;
    type IntoIter = Cursor<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ends an enumeration after its first error and releases the inner cursor
/// as soon as it is exhausted.
struct Fuse<T> {
    inner: Option<Cursor<T>>,
}

impl<T> Fuse<T> {
    fn new(inner: Cursor<T>) -> Self {
        Fuse { inner: Some(inner) }
    }
}

impl<T> Iterator for Fuse<T> {
    type Item = QueryResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.as_mut()?.next();
        match item {
            Some(Ok(value)) => Some(Ok(value)),
            Some(Err(err)) => {
                self.inner = None;
                Some(Err(err))
            }
            None => {
                self.inner = None;
                None
            }
        }
    }
}
