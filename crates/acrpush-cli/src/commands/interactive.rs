use std::sync::Arc;

use acrpush_cloud::{Gateway, OutputSink};
use acrpush_core::Settings;
use anyhow::Context;

use crate::tui;
use crate::wizard::Wizard;

/// Run the selection wizard until the user quits.
pub async fn interactive(settings: Settings) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    let (sink, events) = OutputSink::channel();
    let gateway = Arc::new(Gateway::new().with_sink(sink));

    let wizard = Wizard::new(gateway, settings, cwd);
    tui::run(wizard, events).await
}
