//! UDP broadcast transport
//!
//! Best-effort, connectionless signalling over the local broadcast domain.
//! Sends are fire-and-forget; a lost datagram costs a missed dance cue and
//! nothing else.

mod broadcast;
mod listener;

pub use broadcast::{BroadcastTransport, MutedTransport, SignalTransport};
pub use listener::PeerEventListener;
