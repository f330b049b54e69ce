pub mod rules;

pub use rules::ReconcileRules;

use crate::model::{ObjectSet, ObjectType, Params, SnowflakeObject};
use crate::snowflake::sqlgen::{alter_statement, create_statement, drop_statement, DdlStatement};
use crate::util::{ManagerError, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Role every generated statement runs under unless configured otherwise.
pub const DEFAULT_DDL_ROLE: &str = "PERMIFROST";

/// Statements needed to converge one object type, grouped by operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DdlStatements {
    pub drop: Vec<DdlStatement>,
    pub create: Vec<DdlStatement>,
    pub alter: Vec<DdlStatement>,
}

impl DdlStatements {
    pub fn is_empty(&self) -> bool {
        self.drop.is_empty() && self.create.is_empty() && self.alter.is_empty()
    }

    pub fn len(&self) -> usize {
        self.drop.len() + self.create.len() + self.alter.len()
    }

    /// Statements in execution order: drops, then creates, then alters.
    pub fn iter(&self) -> impl Iterator<Item = &DdlStatement> {
        self.drop
            .iter()
            .chain(self.create.iter())
            .chain(self.alter.iter())
    }
}

/// Statements for every object type, keyed in execution order.
pub type StatementPlan = BTreeMap<ObjectType, DdlStatements>;

/// Computes the DDL that turns existing objects into desired objects.
#[derive(Debug, Clone)]
pub struct Reconciler {
    rules: ReconcileRules,
    ddl_role: String,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileRules::default(), DEFAULT_DDL_ROLE)
    }
}

impl Reconciler {
    pub fn new(rules: ReconcileRules, ddl_role: impl Into<String>) -> Self {
        Self {
            rules,
            ddl_role: ddl_role.into(),
        }
    }

    pub fn rules(&self) -> &ReconcileRules {
        &self.rules
    }

    pub fn ddl_role(&self) -> &str {
        &self.ddl_role
    }

    /// Compares `existing` against `desired` for one object type.
    ///
    /// Objects only in `existing` are dropped (unless the type is never
    /// dropped), objects only in `desired` are created, and objects in both
    /// are altered when the desired parameters are not already in place.
    /// Parameters present only on the existing object are left alone.
    pub fn reconcile(
        &self,
        object_type: ObjectType,
        existing: &ObjectSet,
        desired: &ObjectSet,
    ) -> Result<DdlStatements> {
        check_object_type(object_type, existing)?;
        check_object_type(object_type, desired)?;

        info!("Resolving {object_type} objects");

        let existing_by_name = index_by_name(existing);
        let desired_by_name = index_by_name(desired);

        let to_drop: Vec<&SnowflakeObject> = if self.rules.can_drop(object_type) {
            existing.difference(desired).collect()
        } else {
            Vec::new()
        };
        let to_create: Vec<&SnowflakeObject> = desired.difference(existing).collect();

        let mut statements = DdlStatements {
            drop: to_drop
                .iter()
                .map(|obj| drop_statement(&self.ddl_role, object_type, &obj.name))
                .collect(),
            create: to_create
                .iter()
                .map(|obj| create_statement(&self.ddl_role, obj))
                .collect(),
            alter: Vec::new(),
        };

        for (name, desired_obj) in &desired_by_name {
            let Some(existing_obj) = existing_by_name.get(name) else {
                continue;
            };
            if existing_obj != desired_obj {
                return Err(ManagerError::ReconcileError(format!(
                    "kept {object_type} '{name}' paired with a different object"
                )));
            }
            if let Some(changes) = self.params_to_alter(existing_obj, desired_obj) {
                statements.alter.push(alter_statement(
                    &self.ddl_role,
                    object_type,
                    &desired_obj.name,
                    &changes,
                ));
            }
        }

        debug!(
            drop = statements.drop.len(),
            create = statements.create.len(),
            alter = statements.alter.len(),
            "Resolved {object_type} objects"
        );

        Ok(statements)
    }

    /// Desired parameters that differ from the existing object, or `None` if
    /// no ALTER is needed.
    fn params_to_alter(&self, existing: &SnowflakeObject, desired: &SnowflakeObject) -> Option<Params> {
        if desired.params.is_empty() || existing.params == desired.params {
            return None;
        }

        let object_type = desired.object_type;
        let changes: Params = desired
            .params
            .iter()
            .filter(|(key, _)| !self.rules.is_param_ignored(object_type, key))
            .filter(|(key, value)| existing.params.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if changes.is_empty() {
            return None;
        }
        if self.rules.is_object_ignored(object_type, &desired.name) {
            debug!("Skipping ALTER for ignored {object_type} '{}'", desired.name);
            return None;
        }
        Some(changes)
    }
}

fn check_object_type(object_type: ObjectType, objects: &ObjectSet) -> Result<()> {
    match objects.iter().find(|obj| obj.object_type != object_type) {
        Some(obj) => Err(ManagerError::ReconcileError(format!(
            "expected only {object_type} objects, found {} '{}'",
            obj.object_type, obj.name
        ))),
        None => Ok(()),
    }
}

fn index_by_name(objects: &ObjectSet) -> BTreeMap<&str, &SnowflakeObject> {
    objects.iter().map(|obj| (obj.name.as_str(), obj)).collect()
}
