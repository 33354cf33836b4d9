use acrpush_cloud::{CommandExecutor, Gateway, Registry};
use acrpush_core::WorkflowError;

/// Look up a registry's login server by name and resource group.
pub async fn resolve_registry<E: CommandExecutor>(
    gateway: &Gateway<E>,
    name: &str,
    resource_group: &str,
) -> Result<Registry, WorkflowError> {
    let registry = gateway.describe_registry(name, resource_group).await?;
    tracing::info!(
        registry = %registry.name,
        login_server = %registry.login_server,
        "registry resolved"
    );
    Ok(registry)
}
