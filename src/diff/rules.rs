use crate::model::ObjectType;
use std::collections::{BTreeMap, BTreeSet};

/// Per-type exceptions applied while reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRules {
    /// Parameters never altered on existing objects, e.g. one-time bootstrap settings.
    pub ignored_params: BTreeMap<ObjectType, BTreeSet<String>>,
    /// Objects never altered, e.g. built-in accounts.
    pub ignored_objects: BTreeMap<ObjectType, BTreeSet<String>>,
    /// Types that are never dropped.
    pub never_drop: BTreeSet<ObjectType>,
}

fn string_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for ReconcileRules {
    fn default() -> Self {
        let mut ignored_params = BTreeMap::new();
        ignored_params.insert(
            ObjectType::User,
            string_set(&["password", "must_change_password"]),
        );
        ignored_params.insert(
            ObjectType::Warehouse,
            string_set(&["initially_suspended", "statement_timeout_in_seconds"]),
        );

        let mut ignored_objects = BTreeMap::new();
        ignored_objects.insert(ObjectType::User, string_set(&["snowflake"]));

        Self {
            ignored_params,
            ignored_objects,
            never_drop: BTreeSet::from([ObjectType::Schema]),
        }
    }
}

impl ReconcileRules {
    /// Rules with no exceptions at all.
    pub fn none() -> Self {
        Self {
            ignored_params: BTreeMap::new(),
            ignored_objects: BTreeMap::new(),
            never_drop: BTreeSet::new(),
        }
    }

    pub fn ignore_param(mut self, object_type: ObjectType, param: impl Into<String>) -> Self {
        self.ignored_params
            .entry(object_type)
            .or_default()
            .insert(param.into());
        self
    }

    pub fn ignore_object(mut self, object_type: ObjectType, name: impl Into<String>) -> Self {
        self.ignored_objects
            .entry(object_type)
            .or_default()
            .insert(name.into());
        self
    }

    pub fn never_drop(mut self, object_type: ObjectType) -> Self {
        self.never_drop.insert(object_type);
        self
    }

    pub fn is_param_ignored(&self, object_type: ObjectType, param: &str) -> bool {
        self.ignored_params
            .get(&object_type)
            .is_some_and(|params| params.contains(param))
    }

    pub fn is_object_ignored(&self, object_type: ObjectType, name: &str) -> bool {
        self.ignored_objects
            .get(&object_type)
            .is_some_and(|names| names.contains(name))
    }

    pub fn can_drop(&self, object_type: ObjectType) -> bool {
        !self.never_drop.contains(&object_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules() {
        let rules = ReconcileRules::default();
        assert!(rules.is_param_ignored(ObjectType::User, "password"));
        assert!(rules.is_param_ignored(ObjectType::User, "must_change_password"));
        assert!(rules.is_param_ignored(ObjectType::Warehouse, "initially_suspended"));
        assert!(!rules.is_param_ignored(ObjectType::Warehouse, "warehouse_size"));
        assert!(rules.is_object_ignored(ObjectType::User, "snowflake"));
        assert!(!rules.is_object_ignored(ObjectType::Role, "snowflake"));
        assert!(!rules.can_drop(ObjectType::Schema));
        assert!(rules.can_drop(ObjectType::Database));
    }

    #[test]
    fn builder_extends_rules() {
        let rules = ReconcileRules::none()
            .ignore_param(ObjectType::Role, "comment")
            .ignore_object(ObjectType::Role, "sysadmin")
            .never_drop(ObjectType::Database);
        assert!(rules.is_param_ignored(ObjectType::Role, "comment"));
        assert!(rules.is_object_ignored(ObjectType::Role, "sysadmin"));
        assert!(!rules.can_drop(ObjectType::Database));
        assert!(rules.can_drop(ObjectType::Schema));
    }
}
