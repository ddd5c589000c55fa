//! Background peer event listener
//!
//! One long-lived task owns the receive socket: pull datagrams, parse, drop
//! everything malformed or self-originated, and raise the matching pending
//! flag. The task holds no resources beyond the socket, so shutdown simply
//! abandons it and lets the OS reclaim the descriptor.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::NetworkConfig;
use crate::coordination::PeerFlags;
use crate::error::Result;
use crate::identity::Identity;
use crate::protocol::{PeerCommand, PeerMessage};

const RECV_BUFFER_SIZE: usize = 1024;

pub struct PeerEventListener {
    socket: UdpSocket,
    identity: Identity,
    flags: Arc<PeerFlags>,
    join_delay: Duration,
}

impl PeerEventListener {
    /// Bind the shared receive socket
    ///
    /// Reuse-address (and reuse-port where the platform has it) lets several
    /// instances on one host listen on the same port concurrently.
    pub fn bind(config: &NetworkConfig, identity: Identity, flags: Arc<PeerFlags>) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
        socket.set_reuse_port(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port).into())?;

        Ok(Self {
            socket: UdpSocket::from_std(socket.into())?,
            identity,
            flags,
            join_delay: config.join_delay(),
        })
    }

    /// Spawn the receive loop as a detached background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        info!(identity = %self.identity, "peer listener up");
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, _addr)) => {
                    let Some(message) = classify(&buf[..len], &self.identity) else {
                        continue;
                    };
                    self.apply(message).await;
                }
                Err(e) => {
                    // Transient receive errors must never kill the loop.
                    warn!(error = %e, "receive failed");
                }
            }
        }
    }

    async fn apply(&self, message: PeerMessage) {
        match message.command {
            PeerCommand::Dance => {
                info!(peer = %message.sender, "peer is dancing, joining shortly");
                tokio::time::sleep(self.join_delay).await;
                self.flags.raise_dance();
            }
            PeerCommand::PowerOff => {
                info!(peer = %message.sender, "peer powered off");
                self.flags.raise_sad();
            }
        }
    }
}

/// Decode, parse, and self-filter one datagram
///
/// Anything that is not a well-formed peer message from someone else maps to
/// `None` and is dropped without a trace beyond a debug line.
fn classify(payload: &[u8], identity: &Identity) -> Option<PeerMessage> {
    let text = match std::str::from_utf8(payload) {
        Ok(text) => text,
        Err(_) => {
            debug!("discarding non-UTF-8 datagram");
            return None;
        }
    };
    let message = PeerMessage::parse(text)?;
    if message.sender == identity.as_str() {
        // Broadcast self-receipt; loopback suppression.
        return None;
    }
    Some(message)
}
