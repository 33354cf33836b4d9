use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitStatus;

use acrpush_core::WorkflowError;

/// Failure to run an external process to a zero exit.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("{program} not found on PATH")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}{}", last_line(output))]
    CommandFailed {
        command: String,
        status: ExitStatus,
        /// Merged stdout/stderr of the failed run.
        output: String,
    },

    #[error("I/O error while running `{command}`")]
    Io {
        command: String,
        source: std::io::Error,
    },
}

fn last_line(output: &str) -> String {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| format!(": {l}"))
        .unwrap_or_default()
}

/// Typed failure of one gateway operation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Azure CLI is not logged in — run: az login")]
    NotAuthenticated { source: ExecError },

    #[error("failed to read Azure account info")]
    AccountUnreadable { source: ExecError },

    #[error("unexpected {what} response from Azure CLI")]
    UnexpectedResponse {
        what: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to login to tenant: {tenant}")]
    TenantLoginFailed { tenant: String, source: ExecError },

    #[error("failed to set subscription: {subscription}")]
    SubscriptionNotFound {
        subscription: String,
        source: ExecError,
    },

    #[error("failed to list registries")]
    RegistryListFailed { source: ExecError },

    #[error("registry not found: {name}")]
    RegistryNotFound { name: String, source: ExecError },

    #[error("failed to login to registry: {name}")]
    LoginFailed { name: String, source: ExecError },

    #[error("failed to list repositories in {registry}")]
    RepositoryListFailed { registry: String, source: ExecError },

    #[error("failed to list tags of {repository}")]
    TagListFailed {
        repository: String,
        source: ExecError,
    },

    #[error("Docker daemon is not running")]
    EngineUnavailable { source: ExecError },

    #[error("Docker build failed")]
    BuildFailed { source: ExecError },

    #[error("Docker tag failed")]
    TagFailed { source: ExecError },

    #[error("failed to push image: {reference}")]
    PushFailed { reference: String, source: ExecError },

    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),
}

impl ToolError {
    /// The error and its causes on one line, outermost first.
    pub fn message(&self) -> String {
        let mut message = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        message
    }
}

impl From<ToolError> for WorkflowError {
    fn from(err: ToolError) -> Self {
        WorkflowError::Tool(err.message())
    }
}
