use crate::util::{redact, redact_passwords, ManagerError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

const CLIENT_APP_ID: &str = "snowflake-manager";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Rows returned by a statement. Cells are `None` for SQL `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Cell of `row` in `column`, if the column exists and is not null.
    pub fn get<'a>(&self, row: &'a [Option<String>], column: &str) -> Option<&'a str> {
        let index = self.column_index(column)?;
        row.get(index)?.as_deref()
    }
}

/// A warehouse session that statements can be sent to.
#[async_trait]
pub trait Warehouse: Send {
    async fn query(&mut self, sql: &str) -> Result<QueryResult>;

    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.query(sql).await.map(|_| ())
    }
}

/// Credentials and session defaults for a Snowflake account.
#[derive(Clone)]
pub struct SnowflakeConfig {
    pub account: String,
    pub user: String,
    pub password: String,
    pub warehouse: Option<String>,
    pub database: Option<String>,
    pub role: Option<String>,
    /// Overrides `<account>.snowflakecomputing.com`.
    pub host: Option<String>,
}

impl std::fmt::Debug for SnowflakeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeConfig")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &"********")
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("role", &self.role)
            .field("host", &self.host)
            .finish()
    }
}

impl SnowflakeConfig {
    /// Reads `PERMISSION_BOT_*` variables from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            optional(key).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };

        let account = required("PERMISSION_BOT_ACCOUNT");
        let user = required("PERMISSION_BOT_USER");
        let password = required("PERMISSION_BOT_PASSWORD");

        if !missing.is_empty() {
            return Err(ManagerError::ConfigurationError(format!(
                "missing Snowflake credentials in environment: {}",
                missing.join(", ")
            )));
        }

        Ok(SnowflakeConfig {
            account,
            user,
            password,
            warehouse: optional("PERMISSION_BOT_WAREHOUSE"),
            database: optional("PERMISSION_BOT_DATABASE"),
            role: optional("PERMISSION_BOT_ROLE"),
            host: optional("PERMISSION_BOT_HOST"),
        })
    }

    pub fn base_url(&self) -> String {
        match &self.host {
            Some(host) if host.starts_with("http://") || host.starts_with("https://") => {
                host.trim_end_matches('/').to_string()
            }
            Some(host) => format!("https://{}", host.trim_end_matches('/')),
            None => format!("https://{}.snowflakecomputing.com", self.account),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    message: Option<String>,
    code: Option<String>,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn into_data(self, context: &str) -> std::result::Result<T, String> {
        if !self.success {
            let message = self.message.unwrap_or_else(|| "unknown error".to_string());
            return Err(match self.code {
                Some(code) => format!("{context}: {message} (code {code})"),
                None => format!("{context}: {message}"),
            });
        }
        self.data
            .ok_or_else(|| format!("{context}: response contained no data"))
    }
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    #[serde(default)]
    rowtype: Vec<RowType>,
    #[serde(default)]
    rowset: Vec<Vec<Value>>,
    #[serde(default)]
    chunks: Vec<Chunk>,
    #[serde(default)]
    chunk_headers: HashMap<String, String>,
    qrmk: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RowType {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Chunk {
    url: String,
}

fn cell_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Chunk bodies are comma-separated JSON arrays without the enclosing brackets.
fn parse_chunk(body: &str) -> std::result::Result<Vec<Vec<Value>>, serde_json::Error> {
    serde_json::from_str(&format!("[{body}]"))
}

/// A logged-in Snowflake session.
pub struct SnowflakeConnection {
    client: reqwest::Client,
    base_url: String,
    token: String,
    password: String,
    sequence_id: u64,
}

impl SnowflakeConnection {
    pub async fn connect(config: &SnowflakeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .build()
            .map_err(|e| ManagerError::ConnectionError(format!("Failed to build HTTP client: {e}")))?;

        let base_url = config.base_url();
        let url = format!("{base_url}/session/v1/login-request");
        let mut query = vec![("requestId", Uuid::new_v4().to_string())];
        for (key, value) in [
            ("warehouse", &config.warehouse),
            ("databaseName", &config.database),
            ("roleName", &config.role),
        ] {
            if let Some(value) = value {
                query.push((key, value.clone()));
            }
        }

        let body = json!({
            "data": {
                "CLIENT_APP_ID": CLIENT_APP_ID,
                "CLIENT_APP_VERSION": env!("CARGO_PKG_VERSION"),
                "ACCOUNT_NAME": config.account,
                "LOGIN_NAME": config.user,
                "PASSWORD": config.password,
            }
        });

        debug!("Logging in to {base_url} as {}", config.user);
        let connection_error = |e: String| {
            ManagerError::ConnectionError(redact(
                &format!("Failed to connect to {base_url}: {e}"),
                &config.password,
            ))
        };

        let response: ApiResponse<LoginData> = client
            .post(&url)
            .query(&query)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| connection_error(e.to_string()))?
            .json()
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        let login = response.into_data("login failed").map_err(connection_error)?;

        Ok(SnowflakeConnection {
            client,
            base_url,
            token: login.token,
            password: config.password.clone(),
            sequence_id: 0,
        })
    }

    fn authorization(&self) -> String {
        format!("Snowflake Token=\"{}\"", self.token)
    }

    fn connection_error(&self, message: String) -> ManagerError {
        ManagerError::ConnectionError(redact(&message, &self.password))
    }

    async fn fetch_chunk(&self, chunk: &Chunk, data: &QueryData) -> Result<Vec<Vec<Value>>> {
        let mut request = self.client.get(&chunk.url);
        if !data.chunk_headers.is_empty() {
            for (name, value) in &data.chunk_headers {
                request = request.header(name.as_str(), value.as_str());
            }
        } else if let Some(qrmk) = &data.qrmk {
            request = request
                .header("x-amz-server-side-encryption-customer-algorithm", "AES256")
                .header("x-amz-server-side-encryption-customer-key", qrmk.as_str());
        }

        let body = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.connection_error(format!("Failed to download result chunk: {e}")))?
            .text()
            .await
            .map_err(|e| self.connection_error(format!("Failed to read result chunk: {e}")))?;

        parse_chunk(&body)
            .map_err(|e| self.connection_error(format!("Malformed result chunk: {e}")))
    }

    /// Ends the session. Errors are logged, not returned: the run's outcome is already decided.
    pub async fn close(self) {
        let url = format!("{}/session/logout-request?delete=true", self.base_url);
        let result = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(|r| r.error_for_status());
        if let Err(e) = result {
            warn!("Failed to close Snowflake session: {e}");
        }
    }
}

#[async_trait]
impl Warehouse for SnowflakeConnection {
    async fn query(&mut self, sql: &str) -> Result<QueryResult> {
        self.sequence_id += 1;
        let url = format!(
            "{}/queries/v1/query-request?requestId={}",
            self.base_url,
            Uuid::new_v4()
        );
        let submitted_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let body = json!({
            "sqlText": sql,
            "asyncExec": false,
            "sequenceId": self.sequence_id,
            "querySubmissionTime": submitted_at,
        });

        let response: ApiResponse<QueryData> = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .header(reqwest::header::ACCEPT, "application/snowflake")
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.connection_error(format!("Request failed: {e}")))?
            .json()
            .await
            .map_err(|e| self.connection_error(format!("Malformed response: {e}")))?;

        let data = response
            .into_data(sql)
            .map_err(|message| ManagerError::StatementExecutionError {
                statement: redact_passwords(sql),
                message: redact_passwords(&message),
            })?;

        let mut rows: Vec<Vec<Value>> = Vec::new();
        for chunk in &data.chunks {
            rows.extend(self.fetch_chunk(chunk, &data).await?);
        }
        let mut all_rows = data.rowset;
        all_rows.append(&mut rows);

        Ok(QueryResult {
            columns: data.rowtype.into_iter().map(|c| c.name).collect(),
            rows: all_rows
                .into_iter()
                .map(|row| row.into_iter().map(cell_to_string).collect())
                .collect(),
        })
    }
}
