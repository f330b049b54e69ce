use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Parameters whose values are compared and emitted with their case intact.
const CASE_PRESERVING_PARAMS: &[&str] = &[
    "password",
    "comment",
    "display_name",
    "first_name",
    "last_name",
    "email",
];

static PASSWORD_ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\bpassword\s*=\s*)(?:'(?:[^']|'')*'|[^\s,;]+)").expect("valid password regex")
});

const TRUE_VALUES: &[&str] = &["true", "yes", "on"];
const FALSE_VALUES: &[&str] = &["false", "no", "off"];

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("valid identifier regex"));

/// Normalizes a parameter value so that values read from the specification and
/// values read back from `SHOW` output compare equal.
///
/// Booleans become `true`/`false` regardless of case, including the YAML 1.1
/// spellings `yes`/`no`/`on`/`off` that Permifrost files use. Everything else
/// is lowercased unless the parameter is case-preserving.
pub fn normalize_param_value(name: &str, value: &str) -> String {
    let trimmed = value.trim();
    if TRUE_VALUES.iter().any(|v| trimmed.eq_ignore_ascii_case(v)) {
        return "true".to_string();
    }
    if FALSE_VALUES.iter().any(|v| trimmed.eq_ignore_ascii_case(v)) {
        return "false".to_string();
    }
    if CASE_PRESERVING_PARAMS.contains(&name) {
        trimmed.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

/// Snowflake folds unquoted identifiers, so names are compared lowercased.
pub fn normalize_identifier(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether `name` is usable unquoted in DDL. Schema names are `database.schema`.
pub fn is_valid_identifier(name: &str, qualified: bool) -> bool {
    if qualified {
        match name.split_once('.') {
            Some((database, schema)) => {
                IDENTIFIER_RE.is_match(database) && IDENTIFIER_RE.is_match(schema)
            }
            None => false,
        }
    } else {
        IDENTIFIER_RE.is_match(name)
    }
}

/// Replaces every occurrence of `secret` in `text`, so credentials never reach logs or errors.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, "********")
}

/// Masks the value of every `password = '...'` assignment in a statement.
pub fn redact_passwords(sql: &str) -> String {
    PASSWORD_ASSIGNMENT_RE
        .replace_all(sql, "${1}'********'")
        .into_owned()
}

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Statement execution failed: {statement}: {message}")]
    StatementExecutionError { statement: String, message: String },

    #[error("Reconciliation error: {0}")]
    ReconcileError(String),

    #[error("External tool error: {message}")]
    ExternalToolError {
        message: String,
        exit_code: Option<i32>,
        missing_object: bool,
    },
}

pub type Result<T> = std::result::Result<T, ManagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_param_value_handles_booleans() {
        assert_eq!(normalize_param_value("auto_resume", "true"), "true");
        assert_eq!(normalize_param_value("auto_resume", "TRUE"), "true");
        assert_eq!(normalize_param_value("auto_resume", "False"), "false");
    }

    #[test]
    fn normalize_param_value_reads_yaml_1_1_booleans() {
        assert_eq!(normalize_param_value("auto_resume", "yes"), "true");
        assert_eq!(normalize_param_value("auto_resume", "On"), "true");
        assert_eq!(normalize_param_value("disabled", "NO"), "false");
        assert_eq!(normalize_param_value("must_change_password", "off"), "false");
    }

    #[test]
    fn normalize_param_value_lowercases_strings() {
        assert_eq!(normalize_param_value("warehouse_size", "X-Small"), "x-small");
        assert_eq!(normalize_param_value("default_role", "LOADER"), "loader");
        assert_eq!(normalize_param_value("auto_suspend", " 600 "), "600");
    }

    #[test]
    fn normalize_param_value_preserves_case_sensitive_params() {
        assert_eq!(normalize_param_value("comment", "Owned by Data"), "Owned by Data");
        assert_eq!(normalize_param_value("password", "S3cr3T"), "S3cr3T");
    }

    #[test]
    fn normalize_identifier_lowercases() {
        assert_eq!(normalize_identifier("  LOADING "), "loading");
    }

    #[test]
    fn identifiers_are_validated() {
        assert!(is_valid_identifier("loader_2", false));
        assert!(!is_valid_identifier("bad name", false));
        assert!(!is_valid_identifier("1st", false));
        assert!(is_valid_identifier("raw.stripe", true));
        assert!(!is_valid_identifier("stripe", true));
        assert!(!is_valid_identifier("raw.", true));
    }

    #[test]
    fn redact_passwords_masks_assignments() {
        assert_eq!(
            redact_passwords("CREATE USER bob default_role = 'analyst' password = 'it''s secret'"),
            "CREATE USER bob default_role = 'analyst' password = '********'"
        );
        assert_eq!(
            redact_passwords("ALTER USER bob SET PASSWORD='hunter2', comment = 'x'"),
            "ALTER USER bob SET PASSWORD='********', comment = 'x'"
        );
        assert_eq!(
            redact_passwords("CREATE USER bob password = 123456"),
            "CREATE USER bob password = '********'"
        );
        assert_eq!(redact_passwords("DROP USER bob"), "DROP USER bob");
    }

    #[test]
    fn redact_hides_secret() {
        assert_eq!(redact("bad password hunter2", "hunter2"), "bad password ********");
        assert_eq!(redact("nothing", ""), "nothing");
    }
}
