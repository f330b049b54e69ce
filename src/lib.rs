//! snowflake-manager - declarative management of Snowflake objects.
//!
//! This crate compares the warehouses, databases, users, roles and schemas
//! declared in a Permifrost specification with the ones that exist in a
//! Snowflake account, and generates the DROP, CREATE and ALTER statements that
//! make the account match. It is meant to run before Permifrost so that every
//! object a grant refers to already exists.
//!
//! # Quick Start
//!
//! ```no_run
//! use snowflake_manager::prelude::*;
//!
//! let result = drop_create_blocking(DropCreateOptions::new("permifrost.yml").dry_run(true)).unwrap();
//!
//! for object_type in ObjectType::ALL {
//!     for statement in result.statements_for(object_type) {
//!         println!("{statement}");
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! - [`api`] - High-level API mirroring CLI commands
//! - [`prelude`] - Convenient re-exports for common usage
//! - [`model`] - Object model (types, identity, managed parameters)
//! - [`diff`] - Reconciliation of existing and desired objects
//! - [`apply`] - Statement execution
//! - [`parser`] - Specification parsing
//! - [`snowflake`] - Session, inspection and DDL formatting

pub mod api;
pub mod apply;
pub mod diff;
pub mod model;
pub mod parser;
pub mod permifrost;
pub mod prelude;
pub mod snowflake;
pub mod util;
