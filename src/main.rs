//! possel - stdio adapter for the session engine.
//!
//! Reads raw server lines on stdin and writes protocol lines to stdout, so it
//! can be piped through any socket tool (`ncat`, `socat`, `openssl s_client`).
//! Logs go to stderr.

use futures_util::{SinkExt, StreamExt};
use possel::telemetry::spans;
use possel::{Config, Event, EventKind, SessionCommand, SessionEngine, SessionHandle};
use possel_proto::{LineCodec, Message, ProtocolError};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "possel.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        nick = %config.identity.nick,
        autojoin = ?config.session.autojoin,
        "Starting possel"
    );

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
    let (handle, commands) = SessionHandle::channel();
    let engine = SessionEngine::new(config.identity.clone(), config.session.clone(), outbound_tx);

    engine.events().subscribe(EventKind::NewLine, |event| {
        if let Event::NewLine {
            user,
            channel,
            kind,
            content,
        } = event
        {
            info!(channel = %channel, nick = %user.nick, kind = %kind, "{}", content);
        }
        Ok(())
    });

    // Writer task drains the outbound queue until the engine is dropped.
    let writer = tokio::spawn(async move {
        let mut sink = FramedWrite::new(tokio::io::stdout(), LineCodec::new());
        while let Some(msg) = outbound_rx.recv().await {
            match sink.send(msg).await {
                Ok(()) => {}
                Err(ProtocolError::InvalidMessage(e)) => {
                    warn!(error = %e, "Refusing outbound line");
                }
                Err(e) => {
                    error!(error = %e, "Write failed");
                    break;
                }
            }
        }
    });

    let shutdown = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, quitting");
            let _ = shutdown.quit(Some("possel shutting down".to_string()));
        }
    });

    let span = spans::session(&config.identity.nick);
    run(engine, commands).instrument(span).await?;

    drop(handle);
    writer.await?;
    info!("Session closed");
    Ok(())
}

/// Single dispatch path: inbound lines and queued commands, one at a time.
async fn run(
    mut engine: SessionEngine,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
) -> anyhow::Result<()> {
    let mut lines = FramedRead::new(tokio::io::stdin(), LineCodec::new());
    engine.begin_registration()?;

    loop {
        tokio::select! {
            line = lines.next() => match line {
                Some(Ok(line)) => {
                    if let Err(e) = engine.handle_line(&line) {
                        warn!(error = %e, code = e.error_code(), line = %line, "Line abandoned");
                    }
                }
                Some(Err(ProtocolError::LineTooLong { actual, limit })) => {
                    warn!(actual, limit, "Dropping oversized line");
                }
                Some(Err(e)) => {
                    error!(error = %e, "Read failed");
                    break;
                }
                None => {
                    info!("Input closed");
                    break;
                }
            },
            Some(command) = commands.recv() => {
                let quitting = matches!(command, SessionCommand::Quit { .. });
                if let Err(e) = engine.apply(command) {
                    warn!(error = %e, code = e.error_code(), "Command failed");
                }
                if quitting {
                    break;
                }
            }
        }
    }
    Ok(())
}
