//! Mood state machine
//!
//! Single owner of the authoritative mood. All mutation happens on the tick
//! loop; the listener task only raises the pending flags the engine drains.
//! The random source is injected so probability logic is deterministic under
//! test.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::BehaviorConfig;
use crate::coordination::emitter::SignalEmitter;
use crate::coordination::flags::PeerFlags;
use crate::coordination::mood::{MoodState, MoodTransition};

pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Cues published for the presentation layer
#[derive(Debug, Clone)]
pub enum EngineEvent {
    MoodChanged(MoodTransition),
    /// Play a random idle sound
    IdleChirp,
}

pub struct MoodEngine {
    mood: MoodState,
    behavior: BehaviorConfig,
    flags: Arc<PeerFlags>,
    emitter: SignalEmitter,
    rng: Box<dyn RngCore + Send>,
    /// End of the most recent dance; gates the randomized self-trigger
    last_dance_finish: Option<Instant>,
    sad_until: Option<Instant>,
    next_chirp_at: Option<Instant>,
    events: broadcast::Sender<EngineEvent>,
}

impl MoodEngine {
    pub fn new(behavior: BehaviorConfig, flags: Arc<PeerFlags>, emitter: SignalEmitter) -> Self {
        Self::with_rng(behavior, flags, emitter, Box::new(StdRng::from_entropy()))
    }

    /// Construct with a caller-provided random source
    pub fn with_rng(
        behavior: BehaviorConfig,
        flags: Arc<PeerFlags>,
        emitter: SignalEmitter,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            mood: MoodState::Idle,
            behavior,
            flags,
            emitter,
            rng,
            last_dance_finish: None,
            sad_until: None,
            next_chirp_at: None,
            events,
        }
    }

    /// Subscribe to mood changes and presentation cues
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Polled once per render tick by the presentation layer
    pub fn current_mood(&self) -> MoodState {
        self.mood
    }

    /// Local tap/key trigger
    ///
    /// Honored only while idle: a trigger during a dance is dropped, not
    /// queued. The entry is broadcast-worthy, so exactly one DANCE goes out.
    pub async fn on_user_intent(&mut self) {
        if self.mood != MoodState::Idle {
            debug!(mood = %self.mood, "user intent ignored");
            return;
        }
        if self.transition(MoodState::Dancing, "user intent") {
            self.emitter.broadcast_dance().await;
        }
    }

    /// The presentation layer finished playing the dance
    pub async fn on_dance_playback_finished(&mut self) {
        self.dance_finished_at(Instant::now());
    }

    pub(crate) fn dance_finished_at(&mut self, now: Instant) {
        if self.mood != MoodState::Dancing {
            return;
        }
        // Every completion resets the cooldown, whatever started the dance.
        self.last_dance_finish = Some(now);
        self.next_chirp_at = Some(now + self.random_chirp_delay());
        // Invitations that arrived mid-dance are forfeit.
        let _ = self.flags.take_dance();

        if self.rng.gen_bool(self.behavior.sad_flourish_chance) {
            self.enter_sad(now, "post-dance flourish");
        } else {
            self.transition(MoodState::Idle, "dance finished");
        }
    }

    /// Transition to the terminal state and attempt the final broadcast
    ///
    /// Returns only after the POWER_OFF send has been attempted; the caller
    /// may exit the process afterwards.
    pub async fn on_shutdown_requested(&mut self) {
        if self.transition(MoodState::PoweredDown, "shutdown requested") {
            self.emitter.broadcast_power_off().await;
        }
    }

    /// One evaluation of the transition rules
    pub async fn tick(&mut self) {
        self.tick_at(Instant::now()).await;
    }

    /// Tick with an explicit timestamp, for callers that own a frame clock
    pub async fn tick_at(&mut self, now: Instant) {
        match self.mood {
            MoodState::PoweredDown => {}
            MoodState::Dancing => {
                // Busy: a peer departure heard now is advisory only, discard.
                let _ = self.flags.take_sad();
            }
            MoodState::Sad => {
                let _ = self.flags.take_sad();
                if self.sad_until.map_or(true, |until| now >= until) {
                    self.sad_until = None;
                    self.transition(MoodState::Idle, "sad flourish over");
                }
            }
            MoodState::Idle => self.tick_idle(now).await,
        }
    }

    async fn tick_idle(&mut self, now: Instant) {
        if self.flags.take_sad() {
            self.enter_sad(now, "peer powered off");
            return;
        }

        // Peer-triggered entry never re-broadcasts; one invitation must not
        // become a broadcast storm.
        if self.flags.take_dance() {
            self.transition(MoodState::Dancing, "peer dance");
            return;
        }

        if self.cooldown_elapsed(now) && self.rng.gen_bool(self.behavior.chance_to_dance) {
            if self.transition(MoodState::Dancing, "random self-trigger") {
                self.emitter.broadcast_dance().await;
            }
            return;
        }

        match self.next_chirp_at {
            Some(at) if now >= at => {
                let _ = self.events.send(EngineEvent::IdleChirp);
                self.next_chirp_at = Some(now + self.random_chirp_delay());
            }
            Some(_) => {}
            None => self.next_chirp_at = Some(now + self.random_chirp_delay()),
        }
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.last_dance_finish {
            None => true,
            Some(finish) => now.duration_since(finish) >= self.behavior.dance_cooldown(),
        }
    }

    fn enter_sad(&mut self, now: Instant, reason: &str) {
        self.sad_until = Some(now + self.behavior.sad_duration());
        self.transition(MoodState::Sad, reason);
    }

    fn random_chirp_delay(&mut self) -> Duration {
        let min = self.behavior.idle_chirp_min_secs as f64;
        let max = self.behavior.idle_chirp_max_secs as f64;
        Duration::from_secs_f64(self.rng.gen_range(min..=max))
    }

    /// Apply a transition if the state machine allows it
    fn transition(&mut self, to: MoodState, reason: &str) -> bool {
        if !self.mood.can_transition_to(to) {
            debug!(from = %self.mood, to = %to, reason, "transition rejected");
            return false;
        }
        let from = self.mood;
        self.mood = to;
        info!(from = %from, to = %to, reason, "mood transition");
        let _ = self
            .events
            .send(EngineEvent::MoodChanged(MoodTransition::new(from, to, reason)));
        true
    }
}
