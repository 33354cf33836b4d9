//! Docker CLI operations.

use std::path::Path;

use crate::error::ToolError;
use crate::executor::CommandExecutor;
use crate::gateway::{DOCKER, Gateway, args};

impl<E: CommandExecutor> Gateway<E> {
    /// `docker info` fails when the daemon cannot be reached.
    pub async fn ensure_engine_available(&self) -> Result<(), ToolError> {
        self.run(DOCKER, args(["info"]))
            .await
            .map_err(|e| ToolError::EngineUnavailable { source: e })?;
        Ok(())
    }

    pub async fn build_image(
        &self,
        tag: &str,
        dockerfile_path: &Path,
        context_path: &Path,
        platform: Option<&str>,
    ) -> Result<(), ToolError> {
        let dockerfile = utf8(dockerfile_path)?;
        let context = utf8(context_path)?;

        let mut cmd = args(["build"]);
        if let Some(platform) = platform.filter(|p| !p.is_empty()) {
            cmd.extend(args(["--platform", platform]));
        }
        cmd.extend(args(["-t", tag, "-f", dockerfile, context]));

        self.run(DOCKER, cmd)
            .await
            .map_err(|e| ToolError::BuildFailed { source: e })?;
        Ok(())
    }

    pub async fn tag_image(&self, source_tag: &str, target_tag: &str) -> Result<(), ToolError> {
        self.run(DOCKER, args(["tag", source_tag, target_tag]))
            .await
            .map_err(|e| ToolError::TagFailed { source: e })?;
        Ok(())
    }

    pub async fn push_image(&self, reference: &str) -> Result<(), ToolError> {
        self.run(DOCKER, args(["push", reference]))
            .await
            .map_err(|e| ToolError::PushFailed {
                reference: reference.to_owned(),
                source: e,
            })?;
        Ok(())
    }
}

fn utf8(path: &Path) -> Result<&str, ToolError> {
    path.to_str()
        .ok_or_else(|| ToolError::InvalidPath(path.to_path_buf()))
}
