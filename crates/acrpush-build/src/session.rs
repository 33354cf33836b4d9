use acrpush_cloud::{Account, CommandExecutor, Gateway};
use acrpush_core::WorkflowError;

/// Make sure the registry CLI has a usable session.
///
/// Checks the login, switches tenant when `tenant_id` names a different one
/// than the active account, then activates `subscription` if given.
/// Returns the account the session ended up on.
pub async fn open_session<E: CommandExecutor>(
    gateway: &Gateway<E>,
    tenant_id: Option<&str>,
    subscription: Option<&str>,
) -> Result<Account, WorkflowError> {
    gateway.ensure_session_active().await?;
    let mut account = gateway.current_account().await?;

    if let Some(tenant) = tenant_mismatch(&account, tenant_id) {
        tracing::info!(from = %account.tenant_id, to = tenant, "switching tenant");
        gateway.login_tenant(tenant).await?;
        account = gateway.current_account().await?;
    }

    gateway.set_active_subscription(subscription).await?;
    tracing::info!(
        tenant = %account.tenant_name,
        account = %account.account_name,
        "session ready"
    );
    Ok(account)
}

/// Like [`open_session`] but never logs in to another tenant.
///
/// `az login` may need the terminal for a device code, so callers that own
/// the screen use this and report [`tenant_mismatch`] instead.
pub async fn resume_session<E: CommandExecutor>(
    gateway: &Gateway<E>,
    subscription: Option<&str>,
) -> Result<Account, WorkflowError> {
    gateway.ensure_session_active().await?;
    let account = gateway.current_account().await?;
    gateway.set_active_subscription(subscription).await?;
    tracing::info!(
        tenant = %account.tenant_name,
        account = %account.account_name,
        "session resumed"
    );
    Ok(account)
}

/// The requested tenant, if it is set and differs from the account's.
pub fn tenant_mismatch<'a>(account: &Account, tenant_id: Option<&'a str>) -> Option<&'a str> {
    tenant_id
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != account.tenant_id)
}
