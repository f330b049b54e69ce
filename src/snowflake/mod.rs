pub mod connection;
pub mod introspect;
pub mod sqlgen;

pub use connection::{QueryResult, SnowflakeConfig, SnowflakeConnection, Warehouse};
pub use introspect::inspect_object_type;
