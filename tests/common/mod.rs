#![allow(dead_code, unused_imports)]

pub use async_trait::async_trait;
pub use snowflake_manager::api::{drop_create_with, plan_statements, DropCreateOptions, Error};
pub use snowflake_manager::diff::{DdlStatements, ReconcileRules, Reconciler, StatementPlan};
pub use snowflake_manager::model::{ObjectSet, ObjectType, Params, SnowflakeObject};
pub use snowflake_manager::parser::{parse_object_type, SpecDocument};
pub use snowflake_manager::snowflake::{QueryResult, Warehouse};
pub use snowflake_manager::util::ManagerError;
pub use std::collections::HashMap;
pub use std::io::Write;
pub use tempfile::NamedTempFile;

/// In-memory warehouse: answers `SHOW` statements from canned results and
/// records everything else it is asked to execute.
#[derive(Default)]
pub struct FakeWarehouse {
    pub show_results: HashMap<String, QueryResult>,
    pub queries: Vec<String>,
    pub executed: Vec<String>,
    pub fail_on: Option<String>,
}

impl FakeWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_show(mut self, statement: &str, columns: &[&str], rows: &[&[Option<&str>]]) -> Self {
        self.show_results.insert(
            statement.to_string(),
            QueryResult {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(|cell| cell.map(str::to_string)).collect())
                    .collect(),
            },
        );
        self
    }

    pub fn failing_on(mut self, statement: &str) -> Self {
        self.fail_on = Some(statement.to_string());
        self
    }
}

#[async_trait]
impl Warehouse for FakeWarehouse {
    async fn query(&mut self, sql: &str) -> snowflake_manager::util::Result<QueryResult> {
        self.queries.push(sql.to_string());
        if self.fail_on.as_deref() == Some(sql) {
            return Err(ManagerError::StatementExecutionError {
                statement: sql.to_string(),
                message: "SQL access control error: Insufficient privileges".to_string(),
            });
        }
        if sql.starts_with("SHOW ") {
            return Ok(self
                .show_results
                .get(sql)
                .cloned()
                .unwrap_or_else(|| QueryResult {
                    columns: vec!["name".to_string()],
                    rows: Vec::new(),
                }));
        }
        self.executed.push(sql.to_string());
        Ok(QueryResult::default())
    }
}

pub fn object(object_type: ObjectType, name: &str, params: &[(&str, &str)]) -> SnowflakeObject {
    params
        .iter()
        .fold(SnowflakeObject::bare(object_type, name), |obj, (k, v)| {
            obj.with_param(*k, *v)
        })
}

pub fn object_set(objects: Vec<SnowflakeObject>) -> ObjectSet {
    objects.into_iter().collect()
}

pub fn actions(statements: &[snowflake_manager::snowflake::sqlgen::DdlStatement]) -> Vec<String> {
    statements.iter().map(|s| s.action.clone()).collect()
}
