//! Companion runtime
//!
//! Wires identity, transport, listener, and engine together, then runs the
//! fixed-rate tick loop until a shutdown signal arrives. The loop is the sole
//! owner of the mood state; the listener task only raises flags.
//!
//! With no audio layer in-core, the runtime stands in for the presentation
//! callback: a dance ends after the configured duration via
//! `on_dance_playback_finished`.

use std::sync::Arc;
use std::time::Instant;

use tokio::signal;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::coordination::{MoodEngine, MoodState, PeerFlags, SignalEmitter};
use crate::error::Result;
use crate::identity::Identity;
use crate::transport::{BroadcastTransport, MutedTransport, PeerEventListener, SignalTransport};

/// Run the companion until interrupted
pub async fn run(config: AppConfig, identity: Identity) -> Result<()> {
    info!(identity = %identity, port = config.network.port, "companion starting");

    let flags = Arc::new(PeerFlags::new());

    // A host without a usable interface still gets a companion; it just
    // dances alone. Bind failures degrade, they do not abort.
    let transport: Arc<dyn SignalTransport> =
        match BroadcastTransport::bind(&config.network, identity.clone()) {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                warn!(error = %e, "broadcast socket unavailable, running muted");
                Arc::new(MutedTransport)
            }
        };

    match PeerEventListener::bind(&config.network, identity.clone(), flags.clone()) {
        Ok(listener) => {
            // Daemon-style: abandoned at shutdown, the OS reclaims the socket.
            listener.spawn();
        }
        Err(e) => warn!(error = %e, "listen socket unavailable, peers will go unheard"),
    }

    let mut engine = MoodEngine::new(
        config.behavior.clone(),
        flags,
        SignalEmitter::new(transport),
    );

    let mut ticker = tokio::time::interval(config.behavior.tick_interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut dance_ends_at: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if engine.current_mood() == MoodState::Dancing {
                    match dance_ends_at {
                        None => dance_ends_at = Some(Instant::now() + config.behavior.dance_duration()),
                        Some(at) if Instant::now() >= at => {
                            engine.on_dance_playback_finished().await;
                            dance_ends_at = None;
                        }
                        Some(_) => {}
                    }
                } else {
                    dance_ends_at = None;
                }
                engine.tick().await;
            }
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    // The final POWER_OFF attempt must complete before the process exits.
    engine.on_shutdown_requested().await;
    info!("powering down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
