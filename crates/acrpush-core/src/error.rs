use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// The only error kind the wizard and the CI command need to understand.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Dockerfile not found: {}", .0.display())]
    DockerfileNotFound(PathBuf),

    #[error("Build context not found: {}", .0.display())]
    ContextNotFound(PathBuf),

    #[error("selection incomplete: no {0} chosen")]
    Incomplete(&'static str),

    #[error("Missing required settings for CI: {}", .0.join(", "))]
    MissingCiFields(Vec<&'static str>),

    /// A gateway failure translated at the workflow boundary.
    #[error("{0}")]
    Tool(String),
}
