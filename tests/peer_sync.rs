//! Cross-instance coordination over real sockets on loopback.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::rngs::mock::StepRng;
use rand::RngCore;
use tokio::time::sleep;

use mipmesh::{
    BehaviorConfig, BroadcastTransport, Identity, MoodEngine, MoodState, NetworkConfig,
    PeerCommand, PeerEventListener, PeerFlags, SignalEmitter, SignalTransport,
};

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<PeerCommand>>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<PeerCommand> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignalTransport for RecordingTransport {
    async fn send(&self, command: PeerCommand) {
        self.sent.lock().unwrap().push(command);
    }
}

fn loopback_net(port: u16) -> NetworkConfig {
    NetworkConfig {
        port,
        broadcast_addr: "127.0.0.1".to_string(),
        join_delay_ms: 0,
    }
}

/// StepRng pinned at zero succeeds on every probability draw; at max it
/// never does.
fn pinned_rng(draw: u64) -> Box<dyn RngCore + Send> {
    Box::new(StepRng::new(draw, 0))
}

fn quiet_behavior() -> BehaviorConfig {
    BehaviorConfig {
        chance_to_dance: 0.0,
        sad_flourish_chance: 0.0,
        ..Default::default()
    }
}

#[tokio::test]
async fn listener_filters_and_raises_flags_over_the_wire() {
    const PORT: u16 = 42114;
    let net = loopback_net(PORT);
    let flags = Arc::new(PeerFlags::new());
    let me = Identity::custom("MiP_B").unwrap();
    PeerEventListener::bind(&net, me, flags.clone())
        .unwrap()
        .spawn();

    let sender = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let target = ("127.0.0.1", PORT);

    // Self-origin, garbage, and unknown commands must all be swallowed.
    sender.send_to(b"MiP_B:DANCE", target).await.unwrap();
    sender.send_to(b"MiP_B:POWER_OFF", target).await.unwrap();
    sender.send_to(b"no delimiter", target).await.unwrap();
    sender.send_to(b"MiP_A:JUMP", target).await.unwrap();
    sender.send_to(&[0xff, 0xfe, 0x00], target).await.unwrap();
    sleep(Duration::from_millis(250)).await;
    assert!(!flags.dance_pending());
    assert!(!flags.sad_pending());

    // Two invitations before the engine looks collapse into one.
    sender.send_to(b"MiP_A:DANCE", target).await.unwrap();
    sender.send_to(b"MiP_A:DANCE", target).await.unwrap();
    sender.send_to(b"MiP_C:POWER_OFF", target).await.unwrap();
    sleep(Duration::from_millis(250)).await;

    assert!(flags.take_dance());
    assert!(!flags.take_dance());
    assert!(flags.take_sad());
}

#[tokio::test]
async fn two_instances_synchronize_a_dance() {
    const PORT: u16 = 42115;
    let net = loopback_net(PORT);

    // Instance B: real listener, recording transport so any send would show.
    let flags_b = Arc::new(PeerFlags::new());
    let id_b = Identity::custom("MiP_B").unwrap();
    PeerEventListener::bind(&net, id_b, flags_b.clone())
        .unwrap()
        .spawn();
    let recorder_b = Arc::new(RecordingTransport::default());
    let mut engine_b = MoodEngine::with_rng(
        quiet_behavior(),
        flags_b,
        SignalEmitter::new(recorder_b.clone()),
        pinned_rng(u64::MAX),
    );

    // Instance A: real broadcast socket aimed at the shared port, with a
    // random draw that would fire on every eligible tick.
    let id_a = Identity::custom("MiP_A").unwrap();
    let transport_a = Arc::new(BroadcastTransport::bind(&net, id_a).unwrap());
    let flags_a = Arc::new(PeerFlags::new());
    let behavior_a = BehaviorConfig {
        sad_flourish_chance: 0.0,
        ..Default::default()
    };
    let mut engine_a = MoodEngine::with_rng(
        behavior_a,
        flags_a,
        SignalEmitter::new(transport_a),
        pinned_rng(0),
    );

    // A's user taps; A dances and announces it.
    engine_a.on_user_intent().await;
    assert_eq!(engine_a.current_mood(), MoodState::Dancing);

    // B hears it and joins on its next tick, without re-broadcasting.
    sleep(Duration::from_millis(300)).await;
    engine_b.tick().await;
    assert_eq!(engine_b.current_mood(), MoodState::Dancing);
    assert!(recorder_b.sent().is_empty());

    // A's playback ends: back to idle, and the cooldown window holds even
    // though A's random draw succeeds on every tick.
    let t0 = Instant::now();
    engine_a.on_dance_playback_finished().await;
    assert_eq!(engine_a.current_mood(), MoodState::Idle);

    engine_a.tick_at(t0 + Duration::from_secs(29)).await;
    assert_eq!(engine_a.current_mood(), MoodState::Idle);

    engine_a.tick_at(t0 + Duration::from_secs(31)).await;
    assert_eq!(engine_a.current_mood(), MoodState::Dancing);
}
