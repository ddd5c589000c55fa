use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mood state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodState {
    /// Breathing animation, waiting for something to happen
    Idle,
    /// Dance in progress, playback-driven
    Dancing,
    /// Brief sad flourish
    Sad,
    /// Terminal; entered once, on shutdown
    PoweredDown,
}

impl MoodState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodState::Idle => "IDLE",
            MoodState::Dancing => "DANCING",
            MoodState::Sad => "SAD",
            MoodState::PoweredDown => "POWERED_DOWN",
        }
    }

    /// Check if this state can transition to another state
    pub fn can_transition_to(&self, target: MoodState) -> bool {
        use MoodState::*;

        match (self, target) {
            // PoweredDown is terminal
            (PoweredDown, _) => false,
            // Everything may power down
            (_, PoweredDown) => true,

            (Idle, Dancing) => true, // user intent, peer dance, or random trigger
            (Idle, Sad) => true,     // peer departure
            (Dancing, Idle) => true, // playback finished
            (Dancing, Sad) => true,  // post-dance flourish
            (Sad, Idle) => true,     // flourish over

            _ => false,
        }
    }

    /// Is this a state no transition ever leaves?
    pub fn is_terminal(&self) -> bool {
        matches!(self, MoodState::PoweredDown)
    }
}

impl fmt::Display for MoodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for MoodState {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_uppercase().as_str() {
            "IDLE" => Ok(MoodState::Idle),
            "DANCING" => Ok(MoodState::Dancing),
            "SAD" => Ok(MoodState::Sad),
            "POWERED_DOWN" => Ok(MoodState::PoweredDown),
            _ => Err(format!("Unknown mood: {}", s)),
        }
    }
}

/// Mood transition record (for observers and logging)
#[derive(Debug, Clone, Serialize)]
pub struct MoodTransition {
    pub from: MoodState,
    pub to: MoodState,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl MoodTransition {
    pub fn new(from: MoodState, to: MoodState, reason: impl Into<String>) -> Self {
        Self {
            from,
            to,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_round_trip() {
        for state in [
            MoodState::Idle,
            MoodState::Dancing,
            MoodState::Sad,
            MoodState::PoweredDown,
        ] {
            assert_eq!(MoodState::try_from(state.as_str()), Ok(state));
        }
        assert!(MoodState::try_from("ECSTATIC").is_err());
    }

    #[test]
    fn powered_down_is_terminal() {
        let terminal = MoodState::PoweredDown;
        assert!(terminal.is_terminal());
        for target in [
            MoodState::Idle,
            MoodState::Dancing,
            MoodState::Sad,
            MoodState::PoweredDown,
        ] {
            assert!(!terminal.can_transition_to(target));
        }
    }

    #[test]
    fn every_live_state_can_power_down() {
        for state in [MoodState::Idle, MoodState::Dancing, MoodState::Sad] {
            assert!(state.can_transition_to(MoodState::PoweredDown));
        }
    }

    #[test]
    fn no_dance_re_entry() {
        assert!(!MoodState::Dancing.can_transition_to(MoodState::Dancing));
        assert!(!MoodState::Sad.can_transition_to(MoodState::Dancing));
    }
}
