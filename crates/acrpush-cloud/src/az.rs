//! Azure CLI operations.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ToolError;
use crate::executor::CommandExecutor;
use crate::gateway::{AZ, Gateway, args};

const REGISTRY_FIELDS: &str = "name:name,resourceGroup:resourceGroup,loginServer:loginServer";

/// A container registry as reported by `az acr`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub name: String,
    pub resource_group: String,
    /// Hostname used in image references, e.g. `myacr.azurecr.io`.
    pub login_server: String,
}

/// The signed-in account, used for display only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub tenant_id: String,
    pub tenant_name: String,
    pub account_name: String,
}

// tenantDisplayName is null on older CLI versions.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    tenant_id: String,
    tenant_name: Option<String>,
    account_name: Option<String>,
}

impl<E: CommandExecutor> Gateway<E> {
    // ── Session ──

    pub async fn ensure_session_active(&self) -> Result<(), ToolError> {
        self.run(AZ, args(["account", "show"]))
            .await
            .map_err(|e| ToolError::NotAuthenticated { source: e })?;
        Ok(())
    }

    pub async fn current_account(&self) -> Result<Account, ToolError> {
        let output = self
            .run(
                AZ,
                args([
                    "account",
                    "show",
                    "--query",
                    "{tenantId:tenantId,tenantName:tenantDisplayName,accountName:name}",
                    "-o",
                    "json",
                ]),
            )
            .await
            .map_err(|e| ToolError::AccountUnreadable { source: e })?;

        let record: AccountRecord = parse_json(&output, "account")?;
        Ok(Account {
            tenant_name: record.tenant_name.unwrap_or_else(|| record.tenant_id.clone()),
            tenant_id: record.tenant_id,
            account_name: record.account_name.unwrap_or_default(),
        })
    }

    /// Interactive `az login` scoped to one tenant.
    pub async fn login_tenant(&self, tenant_id: &str) -> Result<(), ToolError> {
        self.run(AZ, args(["login", "--tenant", tenant_id]))
            .await
            .map_err(|e| ToolError::TenantLoginFailed {
                tenant: tenant_id.to_owned(),
                source: e,
            })?;
        Ok(())
    }

    /// Switch the active subscription. `None` or a blank id does nothing.
    pub async fn set_active_subscription(&self, subscription: Option<&str>) -> Result<(), ToolError> {
        let Some(subscription) = subscription.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(());
        };

        self.run(AZ, args(["account", "set", "--subscription", subscription]))
            .await
            .map_err(|e| ToolError::SubscriptionNotFound {
                subscription: subscription.to_owned(),
                source: e,
            })?;
        Ok(())
    }

    // ── Registries ──

    /// Registries in the order the CLI returns them.
    pub async fn list_registries(&self) -> Result<Vec<Registry>, ToolError> {
        let query = format!("[].{{{REGISTRY_FIELDS}}}");
        let output = self
            .run(AZ, args(["acr", "list", "--query", &query, "-o", "json"]))
            .await
            .map_err(|e| ToolError::RegistryListFailed { source: e })?;

        parse_json_list(&output, "registry list")
    }

    pub async fn describe_registry(
        &self,
        name: &str,
        resource_group: &str,
    ) -> Result<Registry, ToolError> {
        let query = format!("{{{REGISTRY_FIELDS}}}");
        let output = self
            .run(
                AZ,
                args([
                    "acr",
                    "show",
                    "--name",
                    name,
                    "--resource-group",
                    resource_group,
                    "--query",
                    &query,
                    "-o",
                    "json",
                ]),
            )
            .await
            .map_err(|e| ToolError::RegistryNotFound {
                name: name.to_owned(),
                source: e,
            })?;

        parse_json(&output, "registry")
    }

    /// Lets the build engine push to the registry.
    pub async fn login_to_registry(&self, name: &str) -> Result<(), ToolError> {
        self.run(AZ, args(["acr", "login", "--name", name]))
            .await
            .map_err(|e| ToolError::LoginFailed {
                name: name.to_owned(),
                source: e,
            })?;
        Ok(())
    }

    // ── Repositories ──

    pub async fn list_repositories(&self, registry: &str) -> Result<Vec<String>, ToolError> {
        let output = self
            .run(AZ, args(["acr", "repository", "list", "--name", registry, "-o", "json"]))
            .await
            .map_err(|e| ToolError::RepositoryListFailed {
                registry: registry.to_owned(),
                source: e,
            })?;

        parse_json_list(&output, "repository list")
    }

    /// Tags as stored; nothing is filtered here.
    pub async fn list_tags(&self, registry: &str, repository: &str) -> Result<Vec<String>, ToolError> {
        let output = self
            .run(
                AZ,
                args([
                    "acr",
                    "repository",
                    "show-tags",
                    "--name",
                    registry,
                    "--repository",
                    repository,
                    "-o",
                    "json",
                ]),
            )
            .await
            .map_err(|e| ToolError::TagListFailed {
                repository: repository.to_owned(),
                source: e,
            })?;

        parse_json_list(&output, "tag list")
    }
}

fn parse_json<T: DeserializeOwned>(output: &str, what: &'static str) -> Result<T, ToolError> {
    serde_json::from_str(output).map_err(|e| ToolError::UnexpectedResponse { what, source: e })
}

/// Like [`parse_json`], but an empty response or `null` is an empty list.
fn parse_json_list<T: DeserializeOwned>(
    output: &str,
    what: &'static str,
) -> Result<Vec<T>, ToolError> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = parse_json(output, what)?;
    Ok(items.unwrap_or_default())
}
