//! Terminal front end for the selection wizard.

mod app;
mod terminal;
mod view;

use acrpush_cloud::{GatewayEvent, RealExecutor};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::wizard::Wizard;

use app::App;

/// Take over the terminal and run `wizard` until the user quits.
///
/// `events` must be the receiving end of the wizard gateway's sink.
pub async fn run(
    wizard: Wizard<RealExecutor>,
    events: UnboundedReceiver<GatewayEvent>,
) -> anyhow::Result<()> {
    let mut terminal = terminal::setup_terminal()?;
    let result = App::new(wizard, events).run(&mut terminal).await;
    terminal::restore_terminal(&mut terminal)?;
    result
}
