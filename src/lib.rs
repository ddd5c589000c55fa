pub mod cli;
pub mod config;
pub mod coordination;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod runtime;
pub mod transport;

pub use config::{AppConfig, BehaviorConfig, LoggingConfig, NetworkConfig};
pub use coordination::{
    EngineEvent, MoodEngine, MoodState, MoodTransition, PeerFlags, SignalEmitter,
};
pub use error::{MipmeshError, Result};
pub use identity::Identity;
pub use protocol::{PeerCommand, PeerMessage};
pub use transport::{BroadcastTransport, MutedTransport, PeerEventListener, SignalTransport};
