//! Instance identity generation
//!
//! Every instance gets a human-readable token at startup, used only to tell
//! its own broadcasts apart from peer broadcasts. Collisions are possible and
//! tolerated; this is not a credential.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};

use crate::error::{MipmeshError, Result};
use crate::protocol::WIRE_DELIMITER;

/// Category label every identity starts with
const CATEGORY: &str = "MiP";

/// Fixed pool of qualifier names
const NAMES: &[&str] = &[
    "Jarold",
    "Carl",
    "Timothy",
    "Bartholomew",
    "Garry",
    "Sprocket",
    "Rusty",
    "Zippy",
];

/// Human-readable instance identity, immutable for the process lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Generate a fresh identity from OS entropy
    ///
    /// Generation cannot fail: if the OS random source is unavailable, the
    /// identity falls back to the process-start timestamp as its qualifier,
    /// which preserves uniqueness-in-practice on a shared network.
    pub fn generate() -> Self {
        let mut seed = [0u8; 8];
        match OsRng.try_fill_bytes(&mut seed) {
            Ok(()) => {
                let mut rng = StdRng::seed_from_u64(u64::from_le_bytes(seed));
                Self::generate_with(&mut rng)
            }
            Err(_) => Self::fallback(),
        }
    }

    /// Generate an identity from a caller-provided random source
    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        let name = NAMES[rng.gen_range(0..NAMES.len())];
        let qualifier: u16 = rng.gen_range(100..1000);
        Identity(format!("{CATEGORY}_{name}_{qualifier}"))
    }

    /// Use a fixed identity instead of a generated one
    ///
    /// Rejects tokens that would collide with the wire format.
    pub fn custom(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(MipmeshError::Validation(
                "identity must not be empty".to_string(),
            ));
        }
        if name.contains(WIRE_DELIMITER) || !name.is_ascii() {
            return Err(MipmeshError::Validation(format!(
                "identity must be printable ASCII without '{WIRE_DELIMITER}': {name}"
            )));
        }
        Ok(Identity(name))
    }

    fn fallback() -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Identity(format!("{CATEGORY}_Unit_{ts}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
