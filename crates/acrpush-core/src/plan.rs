use std::path::{Path, PathBuf};

use crate::error::WorkflowError;

/// A fully resolved and validated build-and-push operation.
///
/// Only [`BuildPlan::new`] creates one, and it runs [`validate_paths`]
/// first, so holding a `BuildPlan` means the Dockerfile and the build
/// context existed when the plan was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    registry_server: String,
    repository: String,
    tag: String,
    dockerfile_path: PathBuf,
    build_context: PathBuf,
    skip_latest: bool,
    platform: Option<String>,
}

impl BuildPlan {
    pub fn new(
        registry_server: impl Into<String>,
        repository: impl Into<String>,
        tag: impl Into<String>,
        dockerfile_path: impl Into<PathBuf>,
        build_context: impl Into<PathBuf>,
    ) -> crate::Result<Self> {
        let registry_server = non_empty(registry_server.into(), "registry")?;
        let repository = non_empty(repository.into(), "repository")?;
        let tag = non_empty(tag.into(), "tag")?;
        let dockerfile_path = dockerfile_path.into();
        let build_context = build_context.into();

        validate_paths(&dockerfile_path, &build_context)?;

        Ok(Self {
            registry_server,
            repository,
            tag,
            dockerfile_path,
            build_context,
            skip_latest: false,
            platform: None,
        })
    }

    pub fn with_skip_latest(mut self, skip_latest: bool) -> Self {
        self.skip_latest = skip_latest;
        self
    }

    /// Empty strings are treated as "engine default".
    pub fn with_platform(mut self, platform: Option<String>) -> Self {
        self.platform = platform.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn registry_server(&self) -> &str {
        &self.registry_server
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn dockerfile_path(&self) -> &Path {
        &self.dockerfile_path
    }

    pub fn build_context(&self) -> &Path {
        &self.build_context
    }

    pub fn skip_latest(&self) -> bool {
        self.skip_latest
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    /// `registry/repository:tag`
    pub fn versioned_ref(&self) -> String {
        format!("{}/{}:{}", self.registry_server, self.repository, self.tag)
    }

    /// `registry/repository:latest`
    pub fn latest_ref(&self) -> String {
        format!("{}/{}:latest", self.registry_server, self.repository)
    }
}

fn non_empty(value: String, field: &'static str) -> crate::Result<String> {
    if value.trim().is_empty() {
        Err(WorkflowError::Incomplete(field))
    } else {
        Ok(value)
    }
}

/// Check build inputs on disk.
///
/// The Dockerfile is checked first, so a missing Dockerfile is reported
/// even when the context is also missing.
pub fn validate_paths(dockerfile_path: &Path, build_context: &Path) -> crate::Result<()> {
    if !dockerfile_path.is_file() {
        return Err(WorkflowError::DockerfileNotFound(dockerfile_path.to_path_buf()));
    }
    if !build_context.is_dir() {
        return Err(WorkflowError::ContextNotFound(build_context.to_path_buf()));
    }
    tracing::debug!(
        dockerfile = %dockerfile_path.display(),
        context = %build_context.display(),
        "build paths validated"
    );
    Ok(())
}
