//! Signal emitter
//!
//! Maps broadcast-worthy mood transitions (entering a self- or user-triggered
//! dance, powering down) to exactly one transport send. Best-effort and
//! non-blocking on failure; the transport swallows errors.

use std::sync::Arc;

use tracing::debug;

use crate::protocol::PeerCommand;
use crate::transport::SignalTransport;

#[derive(Clone)]
pub struct SignalEmitter {
    transport: Arc<dyn SignalTransport>,
}

impl SignalEmitter {
    pub fn new(transport: Arc<dyn SignalTransport>) -> Self {
        Self { transport }
    }

    pub async fn broadcast_dance(&self) {
        debug!("announcing dance to the broadcast domain");
        self.transport.send(PeerCommand::Dance).await;
    }

    pub async fn broadcast_power_off(&self) {
        debug!("announcing power-off to the broadcast domain");
        self.transport.send(PeerCommand::PowerOff).await;
    }
}
