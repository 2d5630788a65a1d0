//! Composition root: wires config, storage, backend adapters and the UI
//! shell together for each CLI command.

use std::sync::{mpsc, Arc};

use anyhow::Result;

use crate::{
    backend::{
        channel::{RealtimeChannel, RealtimeSettings},
        fetch::{HttpContactsFetcher, HttpHistoryFetcher, HttpMediaFetcher, HttpUploadDispatcher},
        media::{ProcessAudioBackend, SystemOpener},
        rest::RestClient,
    },
    cli::{Cli, Command},
    infra::{
        config::{self, AppConfig},
        logging,
        session::FileSessionStore,
        storage_layout::StorageLayout,
    },
    ui,
    usecases::{
        auth::{run_guided_auth, GuidedAuthOutcome, RetryPolicy, StdTerminal},
        logout::logout,
        shell::{DefaultShellOrchestrator, ShellServices},
        startup::{plan_startup, StartupFlow},
    },
};

pub fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.config.as_deref())?;
    let layout = StorageLayout::resolve()?;
    layout.ensure_dirs()?;
    let _log_guard = logging::init(&config.logging, &layout)?;

    match cli.command_or_default() {
        Command::Run => run_client(&config, &layout),
        Command::Logout => {
            let store = FileSessionStore::new(&layout);
            let outcome = logout(&store)?;
            if outcome.session_removed {
                println!("Signed out.");
            } else {
                println!("No saved session; nothing to do.");
            }
            Ok(())
        }
    }
}

fn run_client(config: &AppConfig, layout: &StorageLayout) -> Result<()> {
    let store = FileSessionStore::new(layout);

    let session = match plan_startup(&store) {
        StartupFlow::LaunchShell(session) => session,
        StartupFlow::GuidedAuth => {
            let auth_client =
                RestClient::new(&config.server.base_url, layout.media_cache_dir.clone());
            let mut terminal = StdTerminal;
            match run_guided_auth(&mut terminal, &auth_client, &store, &RetryPolicy::default())? {
                GuidedAuthOutcome::Authenticated(session) => session,
                GuidedAuthOutcome::Aborted => return Ok(()),
            }
        }
    };

    let (events_tx, events_rx) = mpsc::channel();

    let channel = RealtimeChannel::start(
        RealtimeSettings {
            socket_url: config.realtime.socket_url.clone(),
            token: session.token.clone(),
            user_id: session.user.id,
            reconnect_attempts: config.realtime.reconnect_attempts,
            reconnect_backoff: config.realtime.reconnect_backoff(),
        },
        events_tx.clone(),
    )?;

    let rest = Arc::new(
        RestClient::new(&config.server.base_url, layout.media_cache_dir.clone())
            .with_token(&session.token),
    );

    let services = ShellServices {
        channel: Box::new(channel),
        history: Box::new(HttpHistoryFetcher::new(
            Arc::clone(&rest),
            events_tx.clone(),
        )),
        contacts: Box::new(HttpContactsFetcher::new(
            Arc::clone(&rest),
            events_tx.clone(),
        )),
        uploads: Box::new(HttpUploadDispatcher::new(
            Arc::clone(&rest),
            events_tx.clone(),
        )),
        media: Box::new(HttpMediaFetcher::new(Arc::clone(&rest), events_tx)),
        opener: Box::new(SystemOpener),
        sessions: Box::new(FileSessionStore::new(layout)),
    };

    let mut orchestrator = DefaultShellOrchestrator::new(
        session,
        config.realtime.typing_ttl(),
        config.composer.typing_idle(),
        services,
        ProcessAudioBackend::new(&config.media.player_command),
    );
    let mut event_source = ui::CrosstermEventSource::new(events_rx);

    ui::shell::start(&mut event_source, &mut orchestrator)
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use super::*;
    use crate::test_support::env_lock;

    #[test]
    fn logout_removes_the_persisted_session() {
        let _guard = env_lock();

        let root = env::temp_dir().join(format!(
            "parley-app-logout-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock should be valid")
                .as_nanos()
        ));
        let xdg = root.join("xdg");
        fs::create_dir_all(&xdg).expect("xdg dir should be creatable");

        let old_xdg = env::var_os("XDG_CONFIG_HOME");
        env::set_var("XDG_CONFIG_HOME", &xdg);

        let layout = StorageLayout::resolve().expect("layout");
        layout.ensure_dirs().expect("layout dirs should be created");
        fs::write(
            layout.session_file(),
            "user_id = 1\nusername = \"me\"\nemail = \"me@example.com\"\ntoken = \"tok\"\ntheme = \"dark\"\n",
        )
        .expect("session should be written");

        let cli = Cli {
            config: Some(root.join("missing-config.toml")),
            command: Some(Command::Logout),
        };

        run(cli).expect("logout should succeed");
        assert!(!layout.session_file().exists());

        match old_xdg {
            Some(value) => env::set_var("XDG_CONFIG_HOME", value),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }

        let _ = fs::remove_dir_all(root);
    }
}
