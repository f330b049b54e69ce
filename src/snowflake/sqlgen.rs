use crate::model::{ObjectType, Params, SnowflakeObject};
use std::fmt;

/// How a parameter value is rendered in DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Number,
    Boolean,
    Text,
}

/// Classifies a value: all digits is a number, `TRUE`/`FALSE` in any case is a
/// boolean, anything else is a string literal.
pub fn classify_value(value: &str) -> ParamKind {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return ParamKind::Number;
    }
    let upper = value.to_uppercase();
    if upper == "TRUE" || upper == "FALSE" {
        return ParamKind::Boolean;
    }
    ParamKind::Text
}

fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Renders `name = value` pairs for use after `CREATE <object>` or `ALTER ... SET`.
pub fn format_parameter_list(params: &Params) -> String {
    params
        .iter()
        .map(|(name, value)| match classify_value(value) {
            ParamKind::Number | ParamKind::Boolean => format!("{name} = {value}"),
            ParamKind::Text => format!("{name} = '{}'", escape_string(value)),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A DDL statement paired with the role switch it must run under.
///
/// The two halves are executed as separate statements against the warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlStatement {
    pub role_switch: String,
    pub action: String,
}

impl DdlStatement {
    fn new(role: &str, action: String) -> Self {
        DdlStatement {
            role_switch: format!("USE ROLE {role}"),
            action,
        }
    }

    /// The statements to send, in order.
    pub fn fragments(&self) -> [&str; 2] {
        [self.role_switch.as_str(), self.action.as_str()]
    }
}

impl fmt::Display for DdlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};", self.role_switch, self.action)
    }
}

pub fn drop_statement(role: &str, object_type: ObjectType, name: &str) -> DdlStatement {
    DdlStatement::new(role, format!("DROP {} {name}", object_type.keyword()))
}

pub fn create_statement(role: &str, object: &SnowflakeObject) -> DdlStatement {
    let action = format!(
        "CREATE {} {} {}",
        object.object_type.keyword(),
        object.name,
        format_parameter_list(&object.params)
    );
    DdlStatement::new(role, action.trim_end().to_string())
}

pub fn alter_statement(
    role: &str,
    object_type: ObjectType,
    name: &str,
    params: &Params,
) -> DdlStatement {
    DdlStatement::new(
        role,
        format!(
            "ALTER {} {name} SET {}",
            object_type.keyword(),
            format_parameter_list(params)
        ),
    )
}
