//! Wire protocol shared by every instance on the broadcast domain
//!
//! A datagram carries exactly one `:`-delimited pair, `<sender_id>:<command>`,
//! as UTF-8 text. No length prefix, no checksum, no version field. Anything
//! that does not match is dropped at this boundary and never reaches the
//! state machine.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Field delimiter of the wire format; identities must never contain it
pub const WIRE_DELIMITER: char = ':';

/// Commands a peer can broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerCommand {
    Dance,
    PowerOff,
}

impl PeerCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeerCommand::Dance => "DANCE",
            PeerCommand::PowerOff => "POWER_OFF",
        }
    }
}

impl fmt::Display for PeerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown peer command: {0}")]
pub struct UnknownCommand(String);

impl FromStr for PeerCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DANCE" => Ok(PeerCommand::Dance),
            "POWER_OFF" => Ok(PeerCommand::PowerOff),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// One parsed peer datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerMessage {
    pub sender: String,
    pub command: PeerCommand,
}

impl PeerMessage {
    pub fn new(sender: impl Into<String>, command: PeerCommand) -> Self {
        Self {
            sender: sender.into(),
            command,
        }
    }

    /// Serialize for the wire
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.sender, WIRE_DELIMITER, self.command)
    }

    /// Parse a received payload
    ///
    /// Returns `None` for anything malformed: missing delimiter, extra
    /// delimiters, or an unrecognized command. Unknown commands are dropped
    /// rather than rejected loudly so newer instances can extend the
    /// vocabulary without crashing older ones.
    pub fn parse(payload: &str) -> Option<Self> {
        let mut parts = payload.split(WIRE_DELIMITER);
        let sender = parts.next()?;
        let command = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        let command = command.parse().ok()?;
        Some(Self::new(sender, command))
    }
}

impl fmt::Display for PeerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_commands() {
        assert_eq!(
            PeerMessage::parse("MiP_Carl_123:DANCE"),
            Some(PeerMessage::new("MiP_Carl_123", PeerCommand::Dance))
        );
        assert_eq!(
            PeerMessage::parse("MiP_Zippy_901:POWER_OFF"),
            Some(PeerMessage::new("MiP_Zippy_901", PeerCommand::PowerOff))
        );
    }

    #[test]
    fn rejects_missing_delimiter() {
        assert_eq!(PeerMessage::parse("DANCE"), None);
        assert_eq!(PeerMessage::parse(""), None);
    }

    #[test]
    fn rejects_extra_delimiters() {
        assert_eq!(PeerMessage::parse("MiP_A:DANCE:extra"), None);
        assert_eq!(PeerMessage::parse("a:b:c:d"), None);
    }

    #[test]
    fn rejects_unknown_command() {
        assert_eq!(PeerMessage::parse("MiP_A:JUMP"), None);
        assert_eq!(PeerMessage::parse("MiP_A:dance"), None);
        assert_eq!(PeerMessage::parse("MiP_A:"), None);
    }

    #[test]
    fn encode_matches_wire_shape() {
        let msg = PeerMessage::new("MiP_Rusty_500", PeerCommand::Dance);
        assert_eq!(msg.encode(), "MiP_Rusty_500:DANCE");
        assert_eq!(PeerMessage::parse(&msg.encode()), Some(msg));
    }

    #[test]
    fn command_tokens_are_stable() {
        assert_eq!(PeerCommand::Dance.to_string(), "DANCE");
        assert_eq!(PeerCommand::PowerOff.to_string(), "POWER_OFF");
        assert_eq!("DANCE".parse::<PeerCommand>(), Ok(PeerCommand::Dance));
        assert!("SLEEP".parse::<PeerCommand>().is_err());
    }
}
