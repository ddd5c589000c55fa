//! Outbound broadcast socket

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::identity::Identity;
use crate::protocol::{PeerCommand, PeerMessage};

/// Seam between the state machine and the network
///
/// `send` is infallible by contract: implementations swallow transport
/// failures, since a missed broadcast is not a correctness failure.
#[async_trait]
pub trait SignalTransport: Send + Sync {
    async fn send(&self, command: PeerCommand);
}

/// Fire-and-forget UDP broadcast sender
pub struct BroadcastTransport {
    socket: UdpSocket,
    identity: Identity,
    target: SocketAddr,
}

impl BroadcastTransport {
    /// Bind a send socket and resolve the broadcast target
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: &NetworkConfig, identity: Identity) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0).into())?;

        let socket = UdpSocket::from_std(socket.into())?;
        let target = config.broadcast_target()?;

        Ok(Self {
            socket,
            identity,
            target,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

#[async_trait]
impl SignalTransport for BroadcastTransport {
    async fn send(&self, command: PeerCommand) {
        let payload = PeerMessage::new(self.identity.as_str(), command).encode();
        match self.socket.send_to(payload.as_bytes(), self.target).await {
            Ok(_) => debug!(%command, target = %self.target, "broadcast sent"),
            Err(e) => warn!(%command, error = %e, "broadcast failed, dropping"),
        }
    }
}

/// Transport that drops every signal
///
/// Stands in for the broadcast socket when no usable interface is available,
/// keeping the companion alive in solo mode.
pub struct MutedTransport;

#[async_trait]
impl SignalTransport for MutedTransport {
    async fn send(&self, command: PeerCommand) {
        debug!(%command, "transport muted, dropping signal");
    }
}
