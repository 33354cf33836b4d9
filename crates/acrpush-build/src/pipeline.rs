use std::fmt;

use acrpush_cloud::{CommandExecutor, Gateway, ToolError};
use acrpush_core::{BuildPlan, WorkflowError};

/// One external-tool step of a build-and-push run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    EngineCheck,
    Build,
    TagLatest,
    Push,
    PushLatest,
}

impl Step {
    /// Steps `plan` requires, in execution order.
    pub fn sequence(plan: &BuildPlan) -> Vec<Step> {
        if plan.skip_latest() {
            vec![Step::EngineCheck, Step::Build, Step::Push]
        } else {
            vec![
                Step::EngineCheck,
                Step::Build,
                Step::TagLatest,
                Step::Push,
                Step::PushLatest,
            ]
        }
    }

    async fn run<E: CommandExecutor>(
        self,
        gateway: &Gateway<E>,
        plan: &BuildPlan,
    ) -> Result<(), ToolError> {
        match self {
            Step::EngineCheck => gateway.ensure_engine_available().await,
            Step::Build => {
                gateway
                    .build_image(
                        &plan.versioned_ref(),
                        plan.dockerfile_path(),
                        plan.build_context(),
                        plan.platform(),
                    )
                    .await
            }
            Step::TagLatest => {
                gateway
                    .tag_image(&plan.versioned_ref(), &plan.latest_ref())
                    .await
            }
            Step::Push => gateway.push_image(&plan.versioned_ref()).await,
            Step::PushLatest => gateway.push_image(&plan.latest_ref()).await,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::EngineCheck => "check build engine",
            Step::Build => "build image",
            Step::TagLatest => "tag latest",
            Step::Push => "push image",
            Step::PushLatest => "push latest",
        };
        f.write_str(label)
    }
}

/// Build `plan` and push it, stopping at the first failing step.
///
/// Returns the steps that ran, all successfully.
pub async fn build_and_push<E: CommandExecutor>(
    gateway: &Gateway<E>,
    plan: &BuildPlan,
) -> Result<Vec<Step>, WorkflowError> {
    let steps = Step::sequence(plan);
    tracing::info!(image = %plan.versioned_ref(), steps = steps.len(), "starting build and push");

    for step in &steps {
        tracing::info!(%step, "running step");
        if let Err(e) = step.run(gateway, plan).await {
            tracing::error!(%step, error = %e.message(), "step failed");
            return Err(e.into());
        }
    }

    tracing::info!(image = %plan.versioned_ref(), "build and push completed");
    Ok(steps)
}
