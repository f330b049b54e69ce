//! Convenient re-exports for common snowflake-manager usage.
//!
//! # Example
//!
//! ```no_run
//! use snowflake_manager::prelude::*;
//!
//! let result = drop_create_blocking(DropCreateOptions::new("permifrost.yml").dry_run(true)).unwrap();
//!
//! println!("Generated {} statements", result.total_statements());
//! ```

// Async functions
pub use crate::api::{drop_create, drop_create_with, permifrost, plan_statements, run};

// Blocking functions
pub use crate::api::{drop_create_blocking, permifrost_blocking, run_blocking};

// Options and results
pub use crate::api::{DropCreateOptions, DropCreateResult, PermifrostOptions, RunOptions};

// Error types
pub use crate::api::Error;

// Core types
pub use crate::diff::{DdlStatements, ReconcileRules, Reconciler, StatementPlan};
pub use crate::model::{ObjectSet, ObjectType, Params, SnowflakeObject};
pub use crate::parser::{load_spec, parse_object_type, SpecDocument};
pub use crate::snowflake::sqlgen::{format_parameter_list, DdlStatement};
pub use crate::snowflake::{SnowflakeConfig, SnowflakeConnection, Warehouse};
