//! Peer coordination core
//!
//! Owns the authoritative mood of this instance and the transition rules:
//! - Pending flags: the depth-1 mailbox the listener writes into
//! - Mood state machine with randomized self-triggers and cooldown
//! - Signal emitter mapping broadcast-worthy transitions to sends

pub mod emitter;
pub mod engine;
pub mod flags;
pub mod mood;

pub use emitter::SignalEmitter;
pub use engine::{EngineEvent, MoodEngine, EVENT_CHANNEL_CAPACITY};
pub use flags::PeerFlags;
pub use mood::{MoodState, MoodTransition};
