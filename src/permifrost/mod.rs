use crate::util::{ManagerError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{error, info, warn};

/// Failure text Permifrost prints when a grant references an object that is not there yet.
const MISSING_OBJECT_MARKER: &str = "Object does not exist";

#[derive(Debug, Clone)]
pub struct PermifrostOptions {
    pub spec_path: PathBuf,
    pub dry_run: bool,
    /// Executable to run; `permifrost` on `PATH` by default.
    pub program: String,
}

impl PermifrostOptions {
    pub fn new(spec_path: impl Into<PathBuf>) -> Self {
        Self {
            spec_path: spec_path.into(),
            dry_run: false,
            program: "permifrost".to_string(),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["run".to_string(), path_arg(&self.spec_path)];
        if self.dry_run {
            args.push("--dry".to_string());
        }
        args
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Whether a Permifrost failure is caused by an object that does not exist yet.
pub fn is_missing_object_error(output: &str) -> bool {
    output.contains(MISSING_OBJECT_MARKER)
}

/// Turns a failed Permifrost run into an error, logging it the way operators expect.
pub fn classify_failure(exit_code: Option<i32>, output: &str) -> ManagerError {
    let missing_object = is_missing_object_error(output);
    if missing_object {
        error!(
            "Permifrost failed because an object does not exist in Snowflake. \
             This is expected for objects added to the specification for the first time \
             during a dry run: they are only created once drop-create runs without --dry.\n{output}"
        );
    } else {
        error!("{output}");
    }
    let message = match exit_code {
        Some(code) => format!("permifrost exited with status {code}"),
        None => "permifrost was terminated by a signal".to_string(),
    };
    ManagerError::ExternalToolError {
        message,
        exit_code,
        missing_object,
    }
}

/// Runs `permifrost run <spec> [--dry]`, forwarding its output to the log.
pub async fn run_permifrost(options: &PermifrostOptions) -> Result<()> {
    let args = options.args();
    info!("Running {} {}", options.program, args.join(" "));

    let output = Command::new(&options.program)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ManagerError::ExternalToolError {
            message: format!("failed to start {}: {e}", options.program),
            exit_code: None,
            missing_object: false,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        let combined = format!("{stdout}{stderr}");
        return Err(classify_failure(output.status.code(), &combined));
    }

    if !stdout.trim().is_empty() {
        info!("{}", stdout.trim_end());
    }
    if !stderr.trim().is_empty() {
        warn!("{}", stderr.trim_end());
    }
    Ok(())
}
