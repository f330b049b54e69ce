//! Desired-state parsing for Permifrost-style YAML specifications.
//!
//! Each object type lives under its plural key. Entries are either a bare name
//! or a single-key mapping from name to attributes:
//!
//! ```yaml
//! warehouses:
//!   - loading:
//!       warehouse_size: x-small
//!       auto_suspend: 60
//! roles:
//!   - loader:
//!       member_of: [sysadmin]
//! schemas:
//!   - raw.stripe
//! ```
//!
//! Attributes this engine does not manage (`member_of`, `privileges`, ...) are
//! left for the permissions tool.

use crate::model::{ObjectSet, ObjectType, Params, SnowflakeObject};
use crate::util::{is_valid_identifier, normalize_identifier, normalize_param_value, ManagerError, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// A parsed specification document.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocument {
    root: Mapping,
}

impl SpecDocument {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| ManagerError::ConfigurationError(format!("Invalid YAML: {e}")))?;
        match value {
            Value::Mapping(root) => Ok(SpecDocument { root }),
            Value::Null => Ok(SpecDocument {
                root: Mapping::new(),
            }),
            _ => Err(ManagerError::ConfigurationError(
                "Specification must be a mapping of object types".to_string(),
            )),
        }
    }

    fn entries(&self, object_type: ObjectType) -> Result<&[Value]> {
        match self.root.get(object_type.plural().as_str()) {
            None | Some(Value::Null) => Ok(&[]),
            Some(Value::Sequence(entries)) => Ok(entries.as_slice()),
            Some(_) => Err(ManagerError::ConfigurationError(format!(
                "'{}' must be a list",
                object_type.plural()
            ))),
        }
    }
}

/// Reads and parses the specification at `path`.
pub fn load_spec(path: impl AsRef<Path>) -> Result<SpecDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        ManagerError::ConfigurationError(format!(
            "Failed to read specification {}: {e}",
            path.display()
        ))
    })?;
    SpecDocument::from_yaml_str(&content)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn split_entry(object_type: ObjectType, entry: &Value) -> Result<(String, Option<&Mapping>)> {
    let invalid = || {
        ManagerError::ConfigurationError(format!(
            "Invalid {object_type} entry: expected a name or a single-key mapping"
        ))
    };
    match entry {
        Value::Mapping(mapping) if mapping.len() == 1 => {
            let (key, attributes) = mapping.iter().next().ok_or_else(invalid)?;
            let name = scalar_to_string(key).ok_or_else(invalid)?;
            match attributes {
                Value::Mapping(attributes) => Ok((name, Some(attributes))),
                Value::Null => Ok((name, None)),
                _ => Err(ManagerError::ConfigurationError(format!(
                    "Attributes of {object_type} '{name}' must be a mapping"
                ))),
            }
        }
        other => scalar_to_string(other)
            .map(|name| (name, None))
            .ok_or_else(invalid),
    }
}

fn parse_entry(object_type: ObjectType, entry: &Value) -> Result<SnowflakeObject> {
    let (raw_name, attributes) = split_entry(object_type, entry)?;
    let name = normalize_identifier(&raw_name);
    if !is_valid_identifier(&name, object_type == ObjectType::Schema) {
        return Err(ManagerError::ConfigurationError(format!(
            "Invalid {object_type} name '{raw_name}'"
        )));
    }

    let mut params = Params::new();
    if let Some(attributes) = attributes {
        for (key, value) in attributes {
            let Some(key) = key.as_str().map(str::to_lowercase) else {
                continue;
            };
            if !object_type.is_managed_param(&key) {
                continue;
            }
            if let Some(value) = scalar_to_string(value) {
                let value = normalize_param_value(&key, &value);
                params.insert(key, value);
            }
        }
    }

    let missing: Vec<&str> = object_type
        .required_params()
        .iter()
        .copied()
        .filter(|param| !params.contains_key(*param))
        .collect();
    if !missing.is_empty() {
        let listed = missing
            .iter()
            .map(|param| format!("'{param}'"))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ManagerError::ConfigurationError(format!(
            "Missing required parameters for {object_type} '{name}', missing: [{listed}]"
        )));
    }

    Ok(SnowflakeObject::new(object_type, name, params))
}

/// Desired objects of `object_type` declared in `spec`.
///
/// Fails when a declared object lacks one of its type's required parameters
/// or when the same name is declared twice.
pub fn parse_object_type(spec: &SpecDocument, object_type: ObjectType) -> Result<ObjectSet> {
    let mut objects = ObjectSet::new();
    for entry in spec.entries(object_type)? {
        let object = parse_entry(object_type, entry)?;
        if objects.contains(&object) {
            return Err(ManagerError::ConfigurationError(format!(
                "{object_type} '{}' is declared more than once",
                object.name
            )));
        }
        objects.insert(object);
    }
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"
warehouses:
  - loading:
      warehouse_size: X-Small
      auto_suspend: 60
      auto_resume: true
      comment: Used by Fivetran
      owner: sysadmin
databases:
  - raw:
      shared: no
  - analytics
users:
  - Alice:
      can_login: yes
      default_role: analyst
      password: S3cret
      member_of: [analyst]
roles:
  - analyst:
      member_of: [reporter]
schemas:
  - raw.stripe
"#;

    fn spec() -> SpecDocument {
        SpecDocument::from_yaml_str(SPEC).unwrap()
    }

    #[test]
    fn parses_managed_params_only() {
        let warehouses = parse_object_type(&spec(), ObjectType::Warehouse).unwrap();
        let loading = warehouses.iter().next().unwrap();
        let params: Vec<(&str, &str)> = loading
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            params,
            vec![
                ("warehouse_size", "x-small"),
                ("auto_suspend", "60"),
                ("auto_resume", "true"),
                ("comment", "Used by Fivetran"),
            ]
        );
    }

    #[test]
    fn yaml_1_1_booleans_become_true_or_false() {
        let doc = SpecDocument::from_yaml_str(
            "warehouses:\n  - loading:\n      warehouse_size: small\n      auto_suspend: 60\n      auto_resume: yes\n      initially_suspended: Off\nusers:\n  - bob:\n      default_role: analyst\n      disabled: NO\n",
        )
        .unwrap();

        let warehouses = parse_object_type(&doc, ObjectType::Warehouse).unwrap();
        let loading = warehouses.iter().next().unwrap();
        assert_eq!(loading.params.get("auto_resume").map(String::as_str), Some("true"));
        assert_eq!(
            loading.params.get("initially_suspended").map(String::as_str),
            Some("false")
        );

        let users = parse_object_type(&doc, ObjectType::User).unwrap();
        let bob = users.iter().next().unwrap();
        assert_eq!(bob.params.get("disabled").map(String::as_str), Some("false"));
    }

    #[test]
    fn bare_entries_have_no_params() {
        let databases = parse_object_type(&spec(), ObjectType::Database).unwrap();
        let names: Vec<&str> = databases.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["analytics", "raw"]);
        assert!(databases.iter().all(|o| o.params.is_empty()));
    }

    #[test]
    fn names_are_normalized() {
        let users = parse_object_type(&spec(), ObjectType::User).unwrap();
        let alice = users.iter().next().unwrap();
        assert_eq!(alice.name, "alice");
        assert_eq!(alice.params.get("password").map(String::as_str), Some("S3cret"));
        assert!(!alice.params.contains_key("member_of"));
    }

    #[test]
    fn schemas_are_qualified() {
        let schemas = parse_object_type(&spec(), ObjectType::Schema).unwrap();
        assert_eq!(schemas.iter().next().unwrap().name, "raw.stripe");

        let bad = SpecDocument::from_yaml_str("schemas:\n  - stripe\n").unwrap();
        assert!(parse_object_type(&bad, ObjectType::Schema).is_err());
    }

    #[test]
    fn missing_type_is_empty() {
        let doc = SpecDocument::from_yaml_str("roles: []\n").unwrap();
        assert!(parse_object_type(&doc, ObjectType::Warehouse).unwrap().is_empty());
        assert!(parse_object_type(&doc, ObjectType::Role).unwrap().is_empty());
    }

    #[test]
    fn missing_required_user_param() {
        let doc = SpecDocument::from_yaml_str("users:\n  - bob:\n      can_login: yes\n").unwrap();
        let err = parse_object_type(&doc, ObjectType::User).unwrap_err();
        assert!(matches!(err, ManagerError::ConfigurationError(_)));
        assert!(err.to_string().contains("missing: ['default_role']"));
    }

    #[test]
    fn missing_required_warehouse_params() {
        let doc = SpecDocument::from_yaml_str("warehouses:\n  - loading\n").unwrap();
        let err = parse_object_type(&doc, ObjectType::Warehouse).unwrap_err();
        assert!(err
            .to_string()
            .contains("missing: ['warehouse_size', 'auto_suspend']"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let doc = SpecDocument::from_yaml_str("roles:\n  - loader\n  - LOADER\n").unwrap();
        let err = parse_object_type(&doc, ObjectType::Role).unwrap_err();
        assert!(err.to_string().contains("declared more than once"));
    }

    #[test]
    fn non_list_section_is_rejected() {
        let doc = SpecDocument::from_yaml_str("roles:\n  loader: {}\n").unwrap();
        assert!(parse_object_type(&doc, ObjectType::Role).is_err());
    }

    #[test]
    fn invalid_yaml_is_a_configuration_error() {
        let err = SpecDocument::from_yaml_str("roles: [unclosed").unwrap_err();
        assert!(matches!(err, ManagerError::ConfigurationError(_)));
    }

    #[test]
    fn empty_document_declares_nothing() {
        let doc = SpecDocument::from_yaml_str("").unwrap();
        for object_type in ObjectType::ALL {
            assert!(parse_object_type(&doc, object_type).unwrap().is_empty());
        }
    }
}
