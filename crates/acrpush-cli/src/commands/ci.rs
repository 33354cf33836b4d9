use acrpush_build::{build_and_push, open_session, resolve_registry};
use acrpush_cloud::{CommandExecutor, Gateway, GatewayEvent, OutputSink};
use acrpush_core::{BuildPlan, Settings, WorkflowError};
use tokio::sync::mpsc::UnboundedReceiver;

/// Non-interactive build and push driven entirely by `settings`.
pub async fn ci(settings: &Settings) -> Result<(), WorkflowError> {
    settings.require_ci_fields()?;

    let (sink, events) = OutputSink::channel();
    let printer = tokio::spawn(print_events(events));
    let gateway = Gateway::new().with_sink(sink);

    let result = run(&gateway, settings).await;

    // Closing the sink lets the printer drain and stop.
    drop(gateway);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "output printer stopped unexpectedly");
    }

    if result.is_ok() {
        tracing::info!("Build and push completed.");
    }
    result
}

async fn run<E: CommandExecutor>(
    gateway: &Gateway<E>,
    settings: &Settings,
) -> Result<(), WorkflowError> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();

    open_session(
        gateway,
        settings.tenant_id.as_deref(),
        settings.subscription.as_deref(),
    )
    .await?;

    let registry = resolve_registry(
        gateway,
        &text(&settings.acr_name),
        &text(&settings.acr_resource_group),
    )
    .await?;
    gateway.login_to_registry(&registry.name).await?;

    let plan = BuildPlan::new(
        registry.login_server,
        text(&settings.repo_name),
        text(&settings.tag),
        settings.dockerfile_path.clone().unwrap_or_default(),
        settings.build_context.clone().unwrap_or_default(),
    )?
    .with_skip_latest(settings.skip_latest)
    .with_platform(settings.platform.clone());

    build_and_push(gateway, &plan).await?;
    Ok(())
}

async fn print_events(mut events: UnboundedReceiver<GatewayEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            GatewayEvent::Command(command) => println!("$ {command}"),
            GatewayEvent::Output(line) => println!("  {line}"),
        }
    }
}
