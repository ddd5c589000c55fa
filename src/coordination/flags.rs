//! Listener-to-engine pending flags
//!
//! The only shared mutable state between the listener task and the tick loop.
//! Each flag is a depth-1 lossy mailbox: raising an already-raised flag
//! overwrites, it does not queue. Release on raise and AcqRel on take give
//! the tick loop a happens-before edge at the flag boundary; no lock needed
//! for single-writer/single-reader booleans.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct PeerFlags {
    dance_pending: AtomicBool,
    sad_pending: AtomicBool,
}

impl PeerFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise_dance(&self) {
        self.dance_pending.store(true, Ordering::Release);
    }

    pub fn raise_sad(&self) {
        self.sad_pending.store(true, Ordering::Release);
    }

    /// Consume the dance flag, clearing it
    pub fn take_dance(&self) -> bool {
        self.dance_pending.swap(false, Ordering::AcqRel)
    }

    /// Consume the sad flag, clearing it
    pub fn take_sad(&self) -> bool {
        self.sad_pending.swap(false, Ordering::AcqRel)
    }

    pub fn dance_pending(&self) -> bool {
        self.dance_pending.load(Ordering::Acquire)
    }

    pub fn sad_pending(&self) -> bool {
        self.sad_pending.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raising_twice_yields_a_single_take() {
        let flags = PeerFlags::new();
        flags.raise_dance();
        flags.raise_dance();
        assert!(flags.take_dance());
        assert!(!flags.take_dance());
    }

    #[test]
    fn flags_are_independent() {
        let flags = PeerFlags::new();
        flags.raise_sad();
        assert!(!flags.take_dance());
        assert!(flags.take_sad());
        assert!(!flags.take_sad());
    }

    #[test]
    fn take_clears_the_pending_view() {
        let flags = PeerFlags::new();
        flags.raise_dance();
        assert!(flags.dance_pending());
        flags.take_dance();
        assert!(!flags.dance_pending());
    }
}
