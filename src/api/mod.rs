//! High-level API for embedding snowflake-manager in other applications.
//!
//! The functions mirror the CLI commands with structured inputs and outputs.
//! Both async and blocking variants are available.
//!
//! # Example
//!
//! ```no_run
//! use snowflake_manager::api::{drop_create_blocking, DropCreateOptions};
//!
//! let result = drop_create_blocking(DropCreateOptions::new("permifrost.yml").dry_run(true)).unwrap();
//!
//! println!("{} statements", result.total_statements());
//! ```
//!
//! Note: Blocking variants create a new tokio runtime per call.

mod error;
mod options;
mod results;

pub use error::Error;
pub use options::{DropCreateOptions, RunOptions};
pub use results::DropCreateResult;

pub use crate::permifrost::PermifrostOptions;

use crate::apply::{execute_ddl, ApplyOptions};
use crate::diff::{Reconciler, StatementPlan};
use crate::model::{ObjectSet, ObjectType};
use crate::parser::{load_spec, parse_object_type, SpecDocument};
use crate::permifrost::run_permifrost;
use crate::snowflake::{inspect_object_type, SnowflakeConfig, SnowflakeConnection, Warehouse};
use std::collections::BTreeMap;
use tracing::info;

fn log_dry_run_info() {
    info!("{}", "-".repeat(80));
    info!("Running in dry run mode (only SHOW statements are executed)");
    info!("{}", "-".repeat(80));
}

/// Desired objects for every type. Parsing everything up front means a
/// specification error aborts the run before any statement is generated.
fn parse_all(spec: &SpecDocument) -> Result<BTreeMap<ObjectType, ObjectSet>, Error> {
    ObjectType::ALL
        .into_iter()
        .map(|object_type| -> Result<_, Error> {
            Ok((object_type, parse_object_type(spec, object_type)?))
        })
        .collect()
}

/// Inspects the account and reconciles every object type against `spec`.
/// Only `SHOW` statements are sent to the warehouse.
pub async fn plan_statements(
    warehouse: &mut dyn Warehouse,
    spec: &SpecDocument,
    reconciler: &Reconciler,
) -> Result<StatementPlan, Error> {
    let desired = parse_all(spec)?;
    plan_desired(warehouse, &desired, reconciler).await
}

async fn plan_desired(
    warehouse: &mut dyn Warehouse,
    desired: &BTreeMap<ObjectType, ObjectSet>,
    reconciler: &Reconciler,
) -> Result<StatementPlan, Error> {
    let mut plan = StatementPlan::new();
    for (object_type, desired_objects) in desired {
        let existing = inspect_object_type(warehouse, *object_type).await?;
        let statements = reconciler.reconcile(*object_type, &existing, desired_objects)?;
        plan.insert(*object_type, statements);
    }
    Ok(plan)
}

/// Drop-create against an already open session.
pub async fn drop_create_with(
    warehouse: &mut dyn Warehouse,
    spec: &SpecDocument,
    options: &DropCreateOptions,
) -> Result<DropCreateResult, Error> {
    let desired = parse_all(spec)?;
    drop_create_desired(warehouse, &desired, options).await
}

async fn drop_create_desired(
    warehouse: &mut dyn Warehouse,
    desired: &BTreeMap<ObjectType, ObjectSet>,
    options: &DropCreateOptions,
) -> Result<DropCreateResult, Error> {
    let reconciler = Reconciler::new(options.rules.clone(), options.ddl_role.clone());
    let plan = plan_desired(warehouse, desired, &reconciler).await?;

    info!("Statements:");
    let apply = execute_ddl(
        warehouse,
        &plan,
        &ApplyOptions {
            dry_run: options.dry_run,
        },
    )
    .await?;

    Ok(DropCreateResult { plan, apply })
}

/// Drops, creates and alters Snowflake objects so they match the specification.
pub async fn drop_create(options: DropCreateOptions) -> Result<DropCreateResult, Error> {
    info!("Drop/create Snowflake objects started");
    if options.dry_run {
        log_dry_run_info();
    }

    let spec = load_spec(&options.spec_path)?;
    let desired = parse_all(&spec)?;

    let config = match &options.snowflake {
        Some(config) => config.clone(),
        None => SnowflakeConfig::from_env()?,
    };

    info!("Fetching Snowflake metadata and Permifrost specification...");
    let mut connection = SnowflakeConnection::connect(&config).await?;
    let result = drop_create_desired(&mut connection, &desired, &options).await;
    connection.close().await;

    let result = result?;
    info!("Drop/create Snowflake objects completed successfully");
    Ok(result)
}

/// Runs Permifrost against the specification.
pub async fn permifrost(options: PermifrostOptions) -> Result<(), Error> {
    info!("Permifrost started");
    if options.dry_run {
        log_dry_run_info();
    }
    run_permifrost(&options).await?;
    info!("Permifrost completed successfully");
    Ok(())
}

/// Runs drop-create, then Permifrost.
pub async fn run(options: RunOptions) -> Result<DropCreateResult, Error> {
    let result = drop_create(options.drop_create).await?;
    permifrost(options.permifrost).await?;
    Ok(result)
}

fn create_runtime() -> Result<tokio::runtime::Runtime, Error> {
    tokio::runtime::Runtime::new().map_err(|e| Error::runtime(e.to_string()))
}

/// Blocking variant of [`drop_create`].
pub fn drop_create_blocking(options: DropCreateOptions) -> Result<DropCreateResult, Error> {
    create_runtime()?.block_on(drop_create(options))
}

/// Blocking variant of [`permifrost`].
pub fn permifrost_blocking(options: PermifrostOptions) -> Result<(), Error> {
    create_runtime()?.block_on(permifrost(options))
}

/// Blocking variant of [`run`].
pub fn run_blocking(options: RunOptions) -> Result<DropCreateResult, Error> {
    create_runtime()?.block_on(run(options))
}
