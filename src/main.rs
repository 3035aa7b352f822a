//! asciicraft: play Minecraft 1.5.2 servers as an ASCII depth map.

mod config;
mod terminal;

use std::{fs::File, path::Path, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use asciicraft_client::{InputOutcome, SessionManager};
use asciicraft_input::KeyBindings;
use asciicraft_render::RenderSink;
use clap::Parser;
use tracing::{info, warn};

use crate::config::{CliArgs, ClientConfig};
use crate::terminal::{poll_key, TerminalSink};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(&args.log_file)?;
    info!("Starting asciicraft v{}", env!("CARGO_PKG_VERSION"));

    let mut config = ClientConfig::load_from_path(&args.config);
    config.apply_cli_overrides(&args);
    let bindings = KeyBindings::with_overrides(&config.bindings);

    let mut manager = SessionManager::new(config.session_config(), config.render);
    let mut sink = TerminalSink::enter().context("failed to set up the terminal")?;
    for server in &config.servers {
        match manager.open_session(server).await {
            Ok(id) => sink.set_message(format!("connected to {server} as {id}")),
            Err(err) => {
                warn!(%server, %err, "could not open session");
                sink.set_message(format!("{server}: {err}"));
            }
        }
    }

    let result = run(&mut manager, &mut sink, &bindings, config.tick()).await;
    drop(sink);
    shutdown(manager).await;
    result
}

async fn run(
    manager: &mut SessionManager,
    sink: &mut TerminalSink,
    bindings: &KeyBindings,
    tick: Duration,
) -> Result<()> {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;

        while let Some(key) = poll_key(Duration::ZERO)? {
            let Some(action) = bindings.action_for(key) else {
                continue;
            };
            match manager.dispatch_input(action) {
                InputOutcome::Quit => return Ok(()),
                InputOutcome::Rejected(reason) => sink.set_message(format!("{action}: {reason}")),
                InputOutcome::Closed(id) => sink.set_message(format!("closed {id}")),
                InputOutcome::Focused(id) => sink.set_message(format!("switched to {id}")),
                _ => {}
            }
        }

        let (width, height) = TerminalSink::viewport()?;
        manager.set_viewport(width, height);
        let tick = manager.tick();
        for (id, status) in &tick.closed {
            sink.set_message(format!("{id} {status}"));
        }
        match &tick.frame {
            Some(frame) => sink.draw(frame)?,
            None => sink.draw_idle()?,
        }
    }
}

async fn shutdown(mut manager: SessionManager) {
    let ids: Vec<_> = manager.sessions().iter().map(|s| s.id()).collect();
    for id in ids {
        let Some(handle) = manager.close_session(id) else {
            continue;
        };
        if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
            warn!(session = %id, "session did not stop in time");
        }
    }
    info!("bye");
}
