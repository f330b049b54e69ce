use crate::diff::{ReconcileRules, DEFAULT_DDL_ROLE};
use crate::permifrost::PermifrostOptions;
use crate::snowflake::SnowflakeConfig;
use std::path::PathBuf;

/// Options for dropping, creating and altering objects.
#[derive(Debug, Clone)]
pub struct DropCreateOptions {
    /// Permifrost specification (YAML)
    pub spec_path: PathBuf,
    /// Log statements without executing them
    pub dry_run: bool,
    /// Role every DDL statement runs under
    pub ddl_role: String,
    /// Per-type exceptions
    pub rules: ReconcileRules,
    /// Credentials; read from the environment when `None`
    pub snowflake: Option<SnowflakeConfig>,
}

impl DropCreateOptions {
    pub fn new(spec_path: impl Into<PathBuf>) -> Self {
        Self {
            spec_path: spec_path.into(),
            dry_run: false,
            ddl_role: DEFAULT_DDL_ROLE.to_string(),
            rules: ReconcileRules::default(),
            snowflake: None,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_ddl_role(mut self, role: impl Into<String>) -> Self {
        self.ddl_role = role.into();
        self
    }

    pub fn with_rules(mut self, rules: ReconcileRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_snowflake(mut self, config: SnowflakeConfig) -> Self {
        self.snowflake = Some(config);
        self
    }
}

/// Options for running drop-create followed by Permifrost.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub drop_create: DropCreateOptions,
    pub permifrost: PermifrostOptions,
}

impl RunOptions {
    pub fn new(spec_path: impl Into<PathBuf>) -> Self {
        let spec_path = spec_path.into();
        Self {
            drop_create: DropCreateOptions::new(spec_path.clone()),
            permifrost: PermifrostOptions::new(spec_path),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.drop_create = self.drop_create.dry_run(dry_run);
        self.permifrost = self.permifrost.dry_run(dry_run);
        self
    }
}
