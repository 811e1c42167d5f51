pub mod error;
pub mod query_configuration;
pub mod sequence;
pub mod sources;

pub mod operators;
pub mod terminal;

pub mod pipe;
pub mod query_ext;
pub mod stream_bridge;

pub use error::{QueryError, QueryResult};
pub use operators::grouping::Group;
pub use operators::ordering::{Direction, OrderedQuery};
pub use query_configuration::{BufferConfig, QueryConfig};
pub use query_ext::QueryExt;
pub use sequence::{Cursor, Query, Sequence};
pub use stream_bridge::{into_stream, into_value_stream};

// Re-export all source constructors at the crate root
pub use sources::*;
