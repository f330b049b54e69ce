use crate::diff::StatementPlan;
use crate::model::ObjectType;
use crate::snowflake::connection::Warehouse;
use crate::util::{redact_passwords, ManagerError, Result};
use tracing::{error, info};

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyResult {
    /// Statements sent to the warehouse, role switches included.
    pub executed: Vec<String>,
    /// Statements logged, whether or not they were sent.
    pub logged: usize,
    pub dry_run: bool,
}

/// Runs every statement in `plan`: object types in their fixed order, and for
/// each type its drops, then creates, then alters.
///
/// Each statement is logged before it is sent. In dry-run mode nothing is
/// sent. The first failure stops the run; statements already executed stay
/// applied.
pub async fn execute_ddl(
    warehouse: &mut dyn Warehouse,
    plan: &StatementPlan,
    options: &ApplyOptions,
) -> Result<ApplyResult> {
    let mut result = ApplyResult {
        dry_run: options.dry_run,
        ..Default::default()
    };

    for object_type in ObjectType::ALL {
        let Some(statements) = plan.get(&object_type) else {
            continue;
        };
        for statement in statements.iter() {
            for fragment in statement.fragments() {
                let shown = redact_passwords(fragment);
                info!("{shown}");
                result.logged += 1;
                if options.dry_run {
                    continue;
                }
                if let Err(e) = warehouse.execute(fragment).await {
                    let err = match e {
                        ManagerError::ConnectionError(_) => e,
                        ManagerError::StatementExecutionError { statement, message } => {
                            ManagerError::StatementExecutionError {
                                statement: redact_passwords(&statement),
                                message: redact_passwords(&message),
                            }
                        }
                        other => ManagerError::StatementExecutionError {
                            statement: shown.clone(),
                            message: other.to_string(),
                        },
                    };
                    error!("Failed to execute `{shown}`: {err}");
                    return Err(err);
                }
                info!("Executed successfully");
                result.executed.push(fragment.to_string());
            }
        }
    }

    Ok(result)
}
