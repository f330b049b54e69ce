use crate::model::{ObjectSet, ObjectType, Params, SnowflakeObject};
use crate::snowflake::connection::{QueryResult, Warehouse};
use crate::util::{normalize_identifier, normalize_param_value, ManagerError, Result};
use tracing::{debug, warn};

fn show_statement(object_type: ObjectType) -> String {
    match object_type {
        ObjectType::Schema => "SHOW SCHEMAS IN ACCOUNT".to_string(),
        other => format!("SHOW {}", other.plural().to_uppercase()),
    }
}

/// Lists the objects of `object_type` that currently exist in the account.
pub async fn inspect_object_type(
    warehouse: &mut dyn Warehouse,
    object_type: ObjectType,
) -> Result<ObjectSet> {
    let statement = show_statement(object_type);
    debug!("Inspecting {object_type} objects with `{statement}`");
    let result = warehouse.query(&statement).await?;
    objects_from_show(object_type, &result)
}

/// Maps `SHOW` output rows to objects, normalized the same way the parser normalizes.
pub fn objects_from_show(object_type: ObjectType, result: &QueryResult) -> Result<ObjectSet> {
    if result.column_index("name").is_none() {
        return Err(ManagerError::ConnectionError(format!(
            "SHOW output for {} has no name column",
            object_type.plural()
        )));
    }

    let mut objects = ObjectSet::new();
    for row in &result.rows {
        let Some(raw_name) = result.get(row, "name") else {
            continue;
        };
        let mut name = normalize_identifier(raw_name);
        if object_type == ObjectType::Schema {
            let Some(database) = result.get(row, "database_name") else {
                warn!("Skipping schema '{raw_name}' without a database");
                continue;
            };
            name = format!("{}.{name}", normalize_identifier(database));
        }

        let mut params = Params::new();
        for (column, param) in object_type.show_columns() {
            if let Some(value) = result.get(row, column) {
                params.insert(param.to_string(), normalize_param_value(param, value));
            }
        }

        objects.insert(SnowflakeObject::new(object_type, name, params));
    }

    debug!("Found {} existing {}", objects.len(), object_type.plural());
    Ok(objects)
}
