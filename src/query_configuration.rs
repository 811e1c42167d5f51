//! Configuration types for query operations

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// Buffer configuration for operators that materialize their input
/// (ordering, grouping, reverse, join tables, set pre-loading, `to_vec`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub initial_capacity: usize,
    /// Hard limit on buffered elements. `None` means unbounded.
    pub max_capacity: Option<usize>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            max_capacity: None,
        }
    }
}

impl BufferConfig {
    /// Capacity to pre-allocate, never above the hard limit.
    pub fn preallocate(&self) -> usize {
        match self.max_capacity {
            Some(max) => self.initial_capacity.min(max),
            None => self.initial_capacity,
        }
    }

    /// Fails once `len` elements would exceed `max_capacity`.
    pub fn check(&self, operator: &'static str, len: usize) -> QueryResult<()> {
        match self.max_capacity {
            Some(limit) if len > limit => {
                log::warn!("{} hit buffer limit of {} elements", operator, limit);
                Err(QueryError::CapacityExceeded { operator, limit })
            }
            _ => Ok(()),
        }
    }
}

/// Configuration carried by a query chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Name used in log output
    pub label: Option<String>,
    pub buffer: BufferConfig,
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label used in log output
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the initial capacity of materialization buffers
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.buffer.initial_capacity = capacity;
        self
    }

    /// Set the maximum number of elements a buffering operator may hold
    pub fn max_capacity(mut self, capacity: usize) -> Self {
        self.buffer.max_capacity = Some(capacity);
        self
    }

    pub fn validate(&self) -> QueryResult<()> {
        if let Some(max) = self.buffer.max_capacity {
            if max == 0 {
                return Err(QueryError::InvalidConfiguration(
                    "max_capacity must be greater than zero".to_string(),
                ));
            }
            if self.buffer.initial_capacity > max {
                return Err(QueryError::InvalidConfiguration(format!(
                    "initial_capacity ({}) is larger than max_capacity ({})",
                    self.buffer.initial_capacity, max
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn name(&self) -> &str {
        self.label.as_deref().unwrap_or("query")
    }
}
