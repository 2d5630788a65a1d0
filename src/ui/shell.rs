use anyhow::Result;

use crate::usecases::contracts::{AppEventSource, ShellOrchestrator};

use super::{terminal::TerminalSession, view};

pub fn start(
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()> {
    tracing::info!(
        user_id = orchestrator.state().user().id,
        theme = orchestrator.state().theme().as_str(),
        "starting terminal shell"
    );

    let mut terminal = TerminalSession::new()?;

    while orchestrator.state().is_running() {
        terminal.draw(|frame| view::render(frame, orchestrator.state_mut()))?;

        if let Some(event) = event_source.next_event()? {
            orchestrator.handle_event(event)?;
        }
    }

    Ok(())
}
