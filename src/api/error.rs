use crate::util::ManagerError;
use thiserror::Error;

/// Structured error type for snowflake-manager library operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Snowflake connection failed: {message}")]
    Connection { message: String },

    #[error("Statement execution failed: {sql}: {message}")]
    Execution { message: String, sql: String },

    #[error("Reconciliation failed: {message}")]
    Reconcile { message: String },

    #[error("Permifrost failed: {message}")]
    ExternalTool {
        message: String,
        exit_code: Option<i32>,
        /// The failure referenced an object that does not exist in Snowflake yet.
        missing_object: bool,
    },

    #[error("Runtime error: {message}")]
    Runtime { message: String },
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}

impl From<ManagerError> for Error {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::ConfigurationError(message) => Self::Configuration { message },
            ManagerError::ConnectionError(message) => Self::Connection { message },
            ManagerError::StatementExecutionError { statement, message } => Self::Execution {
                message,
                sql: statement,
            },
            ManagerError::ReconcileError(message) => Self::Reconcile { message },
            ManagerError::ExternalToolError {
                message,
                exit_code,
                missing_object,
            } => Self::ExternalTool {
                message,
                exit_code,
                missing_object,
            },
        }
    }
}
