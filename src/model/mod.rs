use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Parameter name to value, in the order they were declared.
pub type Params = IndexMap<String, String>;

/// A set of objects of one type, ordered by name.
pub type ObjectSet = BTreeSet<SnowflakeObject>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectType {
    Warehouse,
    Database,
    User,
    Role,
    Schema,
}

impl ObjectType {
    /// Every supported type, in the order statements are executed.
    pub const ALL: [ObjectType; 5] = [
        ObjectType::Warehouse,
        ObjectType::Database,
        ObjectType::User,
        ObjectType::Role,
        ObjectType::Schema,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Warehouse => "warehouse",
            ObjectType::Database => "database",
            ObjectType::User => "user",
            ObjectType::Role => "role",
            ObjectType::Schema => "schema",
        }
    }

    /// Plural form, used both as the specification key and in `SHOW` statements.
    pub fn plural(&self) -> String {
        format!("{}s", self.as_str())
    }

    /// Keyword used in DDL statements (`CREATE WAREHOUSE ...`).
    pub fn keyword(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Parameters the specification must declare for every object of this type.
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            ObjectType::Warehouse => &["warehouse_size", "auto_suspend"],
            ObjectType::User => &["default_role"],
            ObjectType::Database | ObjectType::Role | ObjectType::Schema => &[],
        }
    }

    /// Parameters this engine manages in addition to the required ones.
    /// Any other key in a specification entry belongs to the permissions tool.
    pub fn optional_params(&self) -> &'static [&'static str] {
        match self {
            ObjectType::Warehouse => &[
                "warehouse_type",
                "auto_resume",
                "initially_suspended",
                "min_cluster_count",
                "max_cluster_count",
                "scaling_policy",
                "statement_timeout_in_seconds",
                "comment",
            ],
            ObjectType::Database => &["data_retention_time_in_days", "comment"],
            ObjectType::User => &[
                "password",
                "must_change_password",
                "login_name",
                "display_name",
                "first_name",
                "last_name",
                "email",
                "disabled",
                "default_warehouse",
                "default_namespace",
                "comment",
            ],
            ObjectType::Role => &["comment"],
            ObjectType::Schema => &["data_retention_time_in_days", "comment"],
        }
    }

    pub fn is_managed_param(&self, name: &str) -> bool {
        self.required_params().contains(&name) || self.optional_params().contains(&name)
    }

    /// `SHOW` output columns and the parameter each one maps to.
    pub fn show_columns(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ObjectType::Warehouse => &[
                ("size", "warehouse_size"),
                ("type", "warehouse_type"),
                ("auto_suspend", "auto_suspend"),
                ("auto_resume", "auto_resume"),
                ("min_cluster_count", "min_cluster_count"),
                ("max_cluster_count", "max_cluster_count"),
                ("scaling_policy", "scaling_policy"),
                ("comment", "comment"),
            ],
            ObjectType::Database => &[
                ("retention_time", "data_retention_time_in_days"),
                ("comment", "comment"),
            ],
            ObjectType::User => &[
                ("login_name", "login_name"),
                ("display_name", "display_name"),
                ("first_name", "first_name"),
                ("last_name", "last_name"),
                ("email", "email"),
                ("disabled", "disabled"),
                ("must_change_password", "must_change_password"),
                ("default_warehouse", "default_warehouse"),
                ("default_namespace", "default_namespace"),
                ("default_role", "default_role"),
                ("comment", "comment"),
            ],
            ObjectType::Role => &[("comment", "comment")],
            ObjectType::Schema => &[
                ("retention_time", "data_retention_time_in_days"),
                ("comment", "comment"),
            ],
        }
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warehouse" | "warehouses" => Ok(ObjectType::Warehouse),
            "database" | "databases" => Ok(ObjectType::Database),
            "user" | "users" => Ok(ObjectType::User),
            "role" | "roles" => Ok(ObjectType::Role),
            "schema" | "schemas" => Ok(ObjectType::Schema),
            _ => Err(format!(
                "Invalid object type '{s}'. Valid types: warehouse, database, user, role, schema"
            )),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A warehouse object as seen by the reconciler.
///
/// Identity is `(object_type, name)`: two objects with the same type and name
/// are the same object even when their parameters differ. Parameter drift is
/// detected separately by the reconciler.
#[derive(Debug, Clone)]
pub struct SnowflakeObject {
    pub object_type: ObjectType,
    pub name: String,
    pub params: Params,
}

impl SnowflakeObject {
    pub fn new(object_type: ObjectType, name: impl Into<String>, params: Params) -> Self {
        SnowflakeObject {
            object_type,
            name: name.into(),
            params,
        }
    }

    /// Object with no parameters.
    pub fn bare(object_type: ObjectType, name: impl Into<String>) -> Self {
        Self::new(object_type, name, Params::new())
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

impl PartialEq for SnowflakeObject {
    fn eq(&self, other: &Self) -> bool {
        self.object_type == other.object_type && self.name == other.name
    }
}

impl Eq for SnowflakeObject {}

impl Hash for SnowflakeObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object_type.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for SnowflakeObject {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SnowflakeObject {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.object_type.cmp(&other.object_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_params() {
        let small = SnowflakeObject::bare(ObjectType::Warehouse, "wh1").with_param("warehouse_size", "small");
        let large = SnowflakeObject::bare(ObjectType::Warehouse, "wh1").with_param("warehouse_size", "large");
        assert_eq!(small, large);

        let mut set = HashSet::new();
        set.insert(small);
        assert!(set.contains(&large));
    }

    #[test]
    fn equality_requires_same_type() {
        let role = SnowflakeObject::bare(ObjectType::Role, "loader");
        let user = SnowflakeObject::bare(ObjectType::User, "loader");
        assert_ne!(role, user);
        assert_ne!(role.cmp(&user), Ordering::Equal);
    }

    #[test]
    fn objects_order_by_name() {
        let set: ObjectSet = ["wh_c", "wh_a", "wh_b"]
            .into_iter()
            .map(|name| SnowflakeObject::bare(ObjectType::Warehouse, name))
            .collect();
        let names: Vec<&str> = set.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["wh_a", "wh_b", "wh_c"]);
    }

    #[test]
    fn params_compare_regardless_of_order() {
        let a = SnowflakeObject::bare(ObjectType::Warehouse, "wh")
            .with_param("warehouse_size", "small")
            .with_param("auto_suspend", "60");
        let b = SnowflakeObject::bare(ObjectType::Warehouse, "wh")
            .with_param("auto_suspend", "60")
            .with_param("warehouse_size", "small");
        assert_eq!(a.params, b.params);
    }

    #[test]
    fn object_type_round_trips_through_strings() {
        for object_type in ObjectType::ALL {
            assert_eq!(object_type.to_string().parse::<ObjectType>(), Ok(object_type));
            assert_eq!(object_type.plural().parse::<ObjectType>(), Ok(object_type));
        }
        assert!("table".parse::<ObjectType>().is_err());
    }

    #[test]
    fn plural_and_keyword() {
        assert_eq!(ObjectType::User.plural(), "users");
        assert_eq!(ObjectType::Warehouse.plural(), "warehouses");
        assert_eq!(ObjectType::Database.plural(), "databases");
        assert_eq!(ObjectType::Schema.plural(), "schemas");
        assert_eq!(ObjectType::Role.plural(), "roles");
        assert_eq!(ObjectType::Schema.keyword(), "SCHEMA");
    }

    #[test]
    fn execution_order_is_fixed() {
        let mut sorted = ObjectType::ALL;
        sorted.sort();
        assert_eq!(sorted, ObjectType::ALL);
        assert_eq!(ObjectType::ALL[0], ObjectType::Warehouse);
        assert_eq!(ObjectType::ALL[4], ObjectType::Schema);
    }

    #[test]
    fn required_params_are_managed() {
        for object_type in ObjectType::ALL {
            for param in object_type.required_params() {
                assert!(object_type.is_managed_param(param));
            }
        }
        assert!(!ObjectType::Role.is_managed_param("member_of"));
    }
}
